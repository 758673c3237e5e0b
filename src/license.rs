use crate::error::{Result, SelectionSheetError};
use chrono::NaiveDate;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Licence gating, chosen by configuration and checked by the host before a session starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LicensePolicy {
    #[default]
    #[schemars(description = "No licence gating; every session is allowed")]
    Disabled,

    #[schemars(description = "Trial licence valid up to and including the expiry date")]
    Trial { expires_on: NaiveDate },
}

impl LicensePolicy {
    pub fn check(&self, today: NaiveDate) -> Result<()> {
        match self {
            LicensePolicy::Disabled => Ok(()),
            LicensePolicy::Trial { expires_on } => {
                if today > *expires_on {
                    warn!("Trial licence expired on {}", expires_on);
                    return Err(SelectionSheetError::LicenseExpired {
                        expired_on: *expires_on,
                    });
                }
                Ok(())
            }
        }
    }

    /// Days left on a trial, `None` when gating is disabled.
    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        match self {
            LicensePolicy::Disabled => None,
            LicensePolicy::Trial { expires_on } => {
                Some((*expires_on - today).num_days().max(0))
            }
        }
    }
}
