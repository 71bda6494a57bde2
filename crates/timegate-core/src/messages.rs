//! User-facing denial and eviction messages
//!
//! Every message names the status that caused it; denial is never a generic
//! error. Window times are rendered from the (possibly stale) record the
//! check returned.

use timegate_store::AccessRecord;
use timegate_util::format_datetime;

/// Message rendering settings, fed from the `[messages]` config section.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    /// Optional support line appended to every denial, e.g. an admin contact.
    pub support_contact: Option<String>,
}

impl Messages {
    pub fn new(support_contact: Option<String>) -> Self {
        Self { support_contact }
    }

    /// No record on file.
    pub fn no_access(&self) -> String {
        self.with_support(
            "Access denied: no access on record.\n\
             Contact an administrator to be granted access."
                .to_string(),
        )
    }

    /// Window has closed; includes the stale window end.
    pub fn expired(&self, record: &AccessRecord) -> String {
        self.with_support(format!(
            "Access denied: your access expired.\n\
             Valid until: {}\n\
             Contact an administrator for an extension.",
            format_datetime(&record.window_end),
        ))
    }

    /// Window has not opened yet; includes start and end.
    pub fn not_started(&self, record: &AccessRecord) -> String {
        self.with_support(format!(
            "Access denied: your access is not active yet.\n\
             Active from: {}\n\
             Active until: {}\n\
             Try again later.",
            format_datetime(&record.window_start),
            format_datetime(&record.window_end),
        ))
    }

    fn with_support(&self, mut message: String) -> String {
        if let Some(contact) = &self.support_contact {
            message.push_str("\nSupport: ");
            message.push_str(contact);
        }
        message
    }
}
