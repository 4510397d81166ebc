use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default TCP port for every PostgreSQL node.
pub const DEFAULT_PORT: u16 = 5432;

/// Default data directory of the primary.
pub const DEFAULT_DATA_DIRECTORY: &str = "/var/lib/postgresql/data";

/// Default number of WAL sender processes.
pub const DEFAULT_MAX_WAL_SENDERS: u32 = 3;

/// Default amount of WAL kept for lagging replicas.
pub const DEFAULT_WAL_KEEP_SIZE: &str = "1GB";

/// Longest identifier PostgreSQL accepts (NAMEDATALEN - 1).
pub const MAX_SLOT_NAME_LEN: usize = 63;

/// A validated primary/replica cluster description.
///
/// Produced by [`validate`](super::validate) with every default filled in.
/// Serialises with the same keys as the input document, so a validated
/// topology can be written back out and loaded again unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    /// The single primary server.
    pub primary: PrimaryNode,
    /// Streaming replicas in document order.
    pub replicas: Vec<ReplicaNode>,
    /// Replication and WAL tuning.
    pub options: Options,
    /// Optional monitoring integration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<Monitoring>,
}

impl Topology {
    /// Whether the Datadog integration should be rendered.
    pub fn datadog(&self) -> Option<&Datadog> {
        self.monitoring
            .as_ref()
            .map(|m| &m.datadog)
            .filter(|d| d.enabled)
    }

    /// Replicas that take part in synchronous commit.
    pub fn sync_replicas(&self) -> impl Iterator<Item = &ReplicaNode> {
        self.replicas
            .iter()
            .filter(|r| r.sync_mode == SyncMode::Sync)
    }
}

/// The primary PostgreSQL server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryNode {
    pub host: String,
    pub port: u16,
    pub data_directory: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub replication_user: String,
    pub replication_password: String,
}

/// A streaming replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaNode {
    pub host: String,
    pub port: u16,
    /// Physical replication slot on the primary; also used as `application_name`.
    pub replication_slot: String,
    pub sync_mode: SyncMode,
    pub db_user: String,
    pub db_password: String,
}

/// Replication and WAL settings applied to the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Options {
    pub wal_level: WalLevel,
    pub max_wal_senders: u32,
    pub wal_keep_size: WalKeepSize,
    pub hot_standby: bool,
    pub synchronous_commit: SynchronousCommit,
    pub promote_on_failure: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            wal_level: WalLevel::default(),
            max_wal_senders: DEFAULT_MAX_WAL_SENDERS,
            wal_keep_size: WalKeepSize::default(),
            hot_standby: false,
            synchronous_commit: SynchronousCommit::default(),
            promote_on_failure: false,
        }
    }
}

/// Monitoring integrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Monitoring {
    pub datadog: Datadog,
}

/// Datadog agent settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Datadog {
    pub enabled: bool,
    pub api_key: String,
    pub site: String,
    /// Password of the `datadog` database user.
    pub password: String,
}

/// Shared parsing error for the closed-set option enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, allowed = $allowed:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Accepted spellings, comma separated, for error messages.
            pub const ALLOWED: &'static str = $allowed;

            /// The value as written in configuration files.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }
    };
}

string_enum! {
    /// How a replica acknowledges commits.
    SyncMode, default = Async, allowed = "sync, async" {
        Sync => "sync",
        Async => "async",
    }
}

string_enum! {
    /// PostgreSQL `wal_level`.
    WalLevel, default = Replica, allowed = "minimal, replica, logical" {
        Minimal => "minimal",
        Replica => "replica",
        Logical => "logical",
    }
}

string_enum! {
    /// PostgreSQL `synchronous_commit`.
    SynchronousCommit, default = On, allowed = "on, off, local, remote_write, remote_apply" {
        On => "on",
        Off => "off",
        Local => "local",
        RemoteWrite => "remote_write",
        RemoteApply => "remote_apply",
    }
}

/// Units PostgreSQL accepts on `wal_keep_size`.
pub const WAL_KEEP_SIZE_UNITS: [&str; 4] = ["kB", "MB", "GB", "TB"];

/// A PostgreSQL `wal_keep_size` value: a bare integer (megabytes) or an
/// integer followed by one of [`WAL_KEEP_SIZE_UNITS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WalKeepSize(String);

/// Why a `wal_keep_size` string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalKeepSizeError {
    /// A known unit was present but the prefix is not an integer.
    NonIntegerAmount,
    /// Neither an integer nor integer + unit.
    Malformed,
}

impl WalKeepSizeError {
    pub fn reason(&self) -> &'static str {
        match self {
            WalKeepSizeError::NonIntegerAmount => "numeric part must be an integer",
            WalKeepSizeError::Malformed => "must be a number with optional unit (kB, MB, GB, TB)",
        }
    }
}

impl WalKeepSize {
    /// Parse and validate a `wal_keep_size` string.
    pub fn parse(raw: &str) -> Result<Self, WalKeepSizeError> {
        if is_integer(raw) {
            return Ok(WalKeepSize(raw.to_string()));
        }
        for unit in WAL_KEEP_SIZE_UNITS {
            if let Some(amount) = raw.strip_suffix(unit) {
                return if is_integer(amount) {
                    Ok(WalKeepSize(raw.to_string()))
                } else {
                    Err(WalKeepSizeError::NonIntegerAmount)
                };
            }
        }
        Err(WalKeepSizeError::Malformed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WalKeepSize {
    fn default() -> Self {
        WalKeepSize(DEFAULT_WAL_KEEP_SIZE.to_string())
    }
}

impl fmt::Display for WalKeepSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// PostgreSQL rejects negative sizes, so only unsigned amounts pass.
fn is_integer(s: &str) -> bool {
    s.parse::<u64>().is_ok()
}
