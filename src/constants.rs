/// Seconds between scheduled backup cycles (5 minutes)
pub const DEFAULT_BACKUP_INTERVAL_SECS: u64 = 300;

/// Seconds to wait after an unexpected fault in a backup cycle
pub const DEFAULT_BACKUP_RETRY_SECS: u64 = 60;

/// Number of timestamped backups kept after pruning
pub const DEFAULT_BACKUP_KEEP_COUNT: usize = 50;

/// File name prefix of timestamped backups
pub const TIMESTAMPED_BACKUP_PREFIX: &str = "app_backup_";

/// File name suffix of timestamped backups
pub const TIMESTAMPED_BACKUP_SUFFIX: &str = ".db";

/// `chrono` format for the timestamp part of a backup file name.
/// Second resolution: two backups in the same second share a name.
pub const TIMESTAMPED_BACKUP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Suffix appended to the store path for the pre-restore safety copy
pub const SAFETY_COPY_SUFFIX: &str = ".before_restore";

/// Timeout for the upstream weather lookup
pub const WEATHER_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for a blank user name
pub const ERR_EMPTY_USER_NAME: &str = "User name cannot be empty";

/// Error message for a blank item name
pub const ERR_EMPTY_ITEM_NAME: &str = "Item name cannot be empty";

/// Error message for a negative inventory quantity
pub const ERR_NEGATIVE_QUANTITY: &str = "Quantity cannot be negative";

/// Error message for a blank city in the weather lookup
pub const ERR_EMPTY_CITY: &str = "City name cannot be empty";
