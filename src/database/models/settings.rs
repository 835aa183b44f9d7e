//! Operator-configured relay settings.
//!
//! One document, keyed `"main_settings"` in the `settings` collection (the
//! manual backup snapshot lives under `"backup_settings"` with the same
//! shape). Every field carries a total default so a partially populated
//! remote document deserializes into a complete mapping - retrieved values
//! win per-field, missing fields keep their defaults.

use std::str::FromStr;

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// The full set of operator-configured settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Channels the bot picks files up from.
    pub source_channels: Vec<i64>,

    /// Channels the bot delivers files to.
    pub destination_channels: Vec<i64>,

    /// When non-empty, only filenames containing one of these words are relayed.
    pub whitelist_words: Vec<String>,

    /// Filenames containing any of these words are skipped.
    pub blacklist_words: Vec<String>,

    /// Words stripped from filenames (case-sensitive exact match).
    pub removed_words: Vec<String>,

    /// Prepended to relayed filenames.
    pub file_prefix: String,

    /// Appended to relayed filenames, before the extension.
    pub file_suffix: String,

    /// Strip @username tags from captions and filenames.
    pub remove_username: bool,

    /// Caption template applied to relayed files.
    pub custom_caption: String,

    /// Opaque link placed at the start of captions.
    pub start_link: Option<String>,

    /// Opaque link placed at the end of captions.
    pub end_link: Option<String>,

    /// Relay files above 2 GiB (Telegram Premium restriction).
    pub process_above_2gb: bool,

    /// Concurrent downloads, always at least 1.
    pub parallel_downloads: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_channels: Vec::new(),
            destination_channels: Vec::new(),
            whitelist_words: Vec::new(),
            blacklist_words: Vec::new(),
            removed_words: Vec::new(),
            file_prefix: String::new(),
            file_suffix: String::new(),
            remove_username: false,
            custom_caption: String::new(),
            start_link: None,
            end_link: None,
            process_above_2gb: false,
            parallel_downloads: 1,
        }
    }
}

/// Names one settings field.
///
/// `as_str` is the field's name in the stored document; `FromStr` accepts
/// the same names, so the command layer can map user input to a field
/// without ever touching an unknown key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    SourceChannels,
    DestinationChannels,
    WhitelistWords,
    BlacklistWords,
    RemovedWords,
    FilePrefix,
    FileSuffix,
    RemoveUsername,
    CustomCaption,
    StartLink,
    EndLink,
    ProcessAbove2gb,
    ParallelDownloads,
}

impl SettingsField {
    /// Every settings field, in document order.
    pub const ALL: [SettingsField; 13] = [
        Self::SourceChannels,
        Self::DestinationChannels,
        Self::WhitelistWords,
        Self::BlacklistWords,
        Self::RemovedWords,
        Self::FilePrefix,
        Self::FileSuffix,
        Self::RemoveUsername,
        Self::CustomCaption,
        Self::StartLink,
        Self::EndLink,
        Self::ProcessAbove2gb,
        Self::ParallelDownloads,
    ];

    /// The field's name in the stored document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceChannels => "source_channels",
            Self::DestinationChannels => "destination_channels",
            Self::WhitelistWords => "whitelist_words",
            Self::BlacklistWords => "blacklist_words",
            Self::RemovedWords => "removed_words",
            Self::FilePrefix => "file_prefix",
            Self::FileSuffix => "file_suffix",
            Self::RemoveUsername => "remove_username",
            Self::CustomCaption => "custom_caption",
            Self::StartLink => "start_link",
            Self::EndLink => "end_link",
            Self::ProcessAbove2gb => "process_above_2gb",
            Self::ParallelDownloads => "parallel_downloads",
        }
    }
}

/// Rejected settings field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown settings field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for SettingsField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A typed change to a single settings field.
///
/// Carrying the value in the variant keeps field name and value type glued
/// together, so a write can never land under the wrong key or corrupt the
/// cache's field set.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    SourceChannels(Vec<i64>),
    DestinationChannels(Vec<i64>),
    WhitelistWords(Vec<String>),
    BlacklistWords(Vec<String>),
    RemovedWords(Vec<String>),
    FilePrefix(String),
    FileSuffix(String),
    RemoveUsername(bool),
    CustomCaption(String),
    StartLink(Option<String>),
    EndLink(Option<String>),
    ProcessAbove2gb(bool),
    ParallelDownloads(u32),
}

impl SettingsUpdate {
    /// The update that restores `field` to its documented default.
    pub fn reset(field: SettingsField) -> Self {
        let defaults = Settings::default();
        match field {
            SettingsField::SourceChannels => Self::SourceChannels(defaults.source_channels),
            SettingsField::DestinationChannels => {
                Self::DestinationChannels(defaults.destination_channels)
            }
            SettingsField::WhitelistWords => Self::WhitelistWords(defaults.whitelist_words),
            SettingsField::BlacklistWords => Self::BlacklistWords(defaults.blacklist_words),
            SettingsField::RemovedWords => Self::RemovedWords(defaults.removed_words),
            SettingsField::FilePrefix => Self::FilePrefix(defaults.file_prefix),
            SettingsField::FileSuffix => Self::FileSuffix(defaults.file_suffix),
            SettingsField::RemoveUsername => Self::RemoveUsername(defaults.remove_username),
            SettingsField::CustomCaption => Self::CustomCaption(defaults.custom_caption),
            SettingsField::StartLink => Self::StartLink(defaults.start_link),
            SettingsField::EndLink => Self::EndLink(defaults.end_link),
            SettingsField::ProcessAbove2gb => Self::ProcessAbove2gb(defaults.process_above_2gb),
            SettingsField::ParallelDownloads => {
                Self::ParallelDownloads(defaults.parallel_downloads)
            }
        }
    }

    /// The field this update targets.
    pub fn field(&self) -> SettingsField {
        match self {
            Self::SourceChannels(_) => SettingsField::SourceChannels,
            Self::DestinationChannels(_) => SettingsField::DestinationChannels,
            Self::WhitelistWords(_) => SettingsField::WhitelistWords,
            Self::BlacklistWords(_) => SettingsField::BlacklistWords,
            Self::RemovedWords(_) => SettingsField::RemovedWords,
            Self::FilePrefix(_) => SettingsField::FilePrefix,
            Self::FileSuffix(_) => SettingsField::FileSuffix,
            Self::RemoveUsername(_) => SettingsField::RemoveUsername,
            Self::CustomCaption(_) => SettingsField::CustomCaption,
            Self::StartLink(_) => SettingsField::StartLink,
            Self::EndLink(_) => SettingsField::EndLink,
            Self::ProcessAbove2gb(_) => SettingsField::ProcessAbove2gb,
            Self::ParallelDownloads(_) => SettingsField::ParallelDownloads,
        }
    }

    /// The new value as it is written to the remote document.
    pub(crate) fn to_bson(&self) -> Bson {
        match self {
            Self::SourceChannels(ids) | Self::DestinationChannels(ids) => {
                Bson::Array(ids.iter().map(|&id| Bson::Int64(id)).collect())
            }
            Self::WhitelistWords(words)
            | Self::BlacklistWords(words)
            | Self::RemovedWords(words) => {
                Bson::Array(words.iter().cloned().map(Bson::String).collect())
            }
            Self::FilePrefix(s) | Self::FileSuffix(s) | Self::CustomCaption(s) => {
                Bson::String(s.clone())
            }
            Self::RemoveUsername(flag) | Self::ProcessAbove2gb(flag) => Bson::Boolean(*flag),
            Self::StartLink(link) | Self::EndLink(link) => {
                link.clone().map_or(Bson::Null, Bson::String)
            }
            Self::ParallelDownloads(n) => Bson::Int64(i64::from((*n).max(1))),
        }
    }

    /// Write the new value into the cached mapping.
    pub(crate) fn apply(self, settings: &mut Settings) {
        match self {
            Self::SourceChannels(ids) => settings.source_channels = ids,
            Self::DestinationChannels(ids) => settings.destination_channels = ids,
            Self::WhitelistWords(words) => settings.whitelist_words = words,
            Self::BlacklistWords(words) => settings.blacklist_words = words,
            Self::RemovedWords(words) => settings.removed_words = words,
            Self::FilePrefix(s) => settings.file_prefix = s,
            Self::FileSuffix(s) => settings.file_suffix = s,
            Self::RemoveUsername(flag) => settings.remove_username = flag,
            Self::CustomCaption(s) => settings.custom_caption = s,
            Self::StartLink(link) => settings.start_link = link,
            Self::EndLink(link) => settings.end_link = link,
            Self::ProcessAbove2gb(flag) => settings.process_above_2gb = flag,
            Self::ParallelDownloads(n) => settings.parallel_downloads = n.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn defaults_are_total() {
        let settings = Settings::default();

        assert!(settings.source_channels.is_empty());
        assert!(settings.destination_channels.is_empty());
        assert!(settings.whitelist_words.is_empty());
        assert!(settings.blacklist_words.is_empty());
        assert!(settings.removed_words.is_empty());
        assert_eq!(settings.file_prefix, "");
        assert_eq!(settings.file_suffix, "");
        assert!(!settings.remove_username);
        assert_eq!(settings.custom_caption, "");
        assert_eq!(settings.start_link, None);
        assert_eq!(settings.end_link, None);
        assert!(!settings.process_above_2gb);
        assert_eq!(settings.parallel_downloads, 1);
    }

    #[test]
    fn partial_document_merges_over_defaults() {
        // Documents written by older builds may miss fields entirely;
        // bookkeeping fields like _id and updated_at are ignored.
        let document = doc! {
            "_id": "main_settings",
            "file_prefix": "X",
            "updated_at": 0_i64,
        };

        let settings: Settings = mongodb::bson::from_document(document).unwrap();

        assert_eq!(settings.file_prefix, "X");
        assert_eq!(settings, Settings {
            file_prefix: "X".to_string(),
            ..Settings::default()
        });
    }

    #[test]
    fn field_names_round_trip() {
        for field in SettingsField::ALL {
            assert_eq!(field.as_str().parse::<SettingsField>(), Ok(field));
        }

        assert_eq!(
            "bogus".parse::<SettingsField>(),
            Err(UnknownField("bogus".to_string()))
        );
    }

    #[test]
    fn reset_produces_the_default_value() {
        let mut settings = Settings {
            file_prefix: "S01_".to_string(),
            parallel_downloads: 4,
            ..Settings::default()
        };

        SettingsUpdate::reset(SettingsField::FilePrefix).apply(&mut settings);
        SettingsUpdate::reset(SettingsField::ParallelDownloads).apply(&mut settings);

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn parallel_downloads_is_floored_at_one() {
        let mut settings = Settings::default();
        SettingsUpdate::ParallelDownloads(0).apply(&mut settings);
        assert_eq!(settings.parallel_downloads, 1);

        assert_eq!(
            SettingsUpdate::ParallelDownloads(0).to_bson(),
            Bson::Int64(1)
        );
    }

    #[test]
    fn update_targets_its_own_field() {
        let update = SettingsUpdate::StartLink(Some("https://t.me/relay".to_string()));
        assert_eq!(update.field(), SettingsField::StartLink);
        assert_eq!(
            update.to_bson(),
            Bson::String("https://t.me/relay".to_string())
        );

        assert_eq!(SettingsUpdate::EndLink(None).to_bson(), Bson::Null);
    }
}
