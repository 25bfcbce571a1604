//! Office (sede) model and the portal context transition table
//!
//! The portal shows the active office as a free-text "enterprise" label. When
//! the label does not match the office a run targets, the driver posts back an
//! office switch with the target's numeric code.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Offices the automation can work in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Office {
    Aldeota,
    Sul,
    Bezerra,
}

impl Office {
    pub const ALL: [Office; 3] = [Office::Aldeota, Office::Sul, Office::Bezerra];

    pub fn name(&self) -> &'static str {
        match self {
            Office::Aldeota => "Aldeota",
            Office::Sul => "Sul",
            Office::Bezerra => "Bezerra",
        }
    }

    /// Value posted to `ctl00_hdnEmpresa` to make this office active
    pub fn switch_code(&self) -> u8 {
        match self {
            Office::Aldeota => 1,
            Office::Sul => 3,
            Office::Bezerra => 4,
        }
    }

    /// Enterprise label as read from the portal header, whitespace removed
    pub fn enterprise_label(&self) -> &'static str {
        match self {
            Office::Aldeota => "DIGITALCOLLEGEALDEOTA-72546",
            Office::Sul => "DIGITALCOLLEGESUL-74070",
            Office::Bezerra => "DIGITALCOLLEGEBEZERRADEMENEZES-488365",
        }
    }

    /// Client code for the Sponte SOAP API
    pub fn client_code(&self) -> &'static str {
        match self {
            Office::Aldeota => "72546",
            Office::Sul => "74070",
            Office::Bezerra => "488365",
        }
    }

    /// Find the office whose enterprise label matches
    pub fn from_enterprise_label(label: &str) -> Option<Office> {
        Office::ALL
            .into_iter()
            .find(|office| office.enterprise_label() == label)
    }
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Office {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        match Office::ALL
            .into_iter()
            .find(|office| office.name().eq_ignore_ascii_case(wanted))
        {
            Some(office) => Ok(office),
            None => bail!(
                "Unknown office '{}' (expected one of: Aldeota, Sul, Bezerra)",
                wanted
            ),
        }
    }
}

/// Entry of the (target office, observed label) transition table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Switch code to post, `None` when the portal is already in the target office
    pub switch_code: Option<u8>,
    pub message: String,
}

/// Look up what to do for a target office given the enterprise label read from the page.
///
/// Returns `None` for labels outside the table; the caller proceeds without switching.
pub fn reconcile(target: Office, detected_label: &str) -> Option<Transition> {
    let current = Office::from_enterprise_label(detected_label)?;

    if current == target {
        Some(Transition {
            switch_code: None,
            message: format!("already at {}", target),
        })
    } else {
        Some(Transition {
            switch_code: Some(target.switch_code()),
            message: format!("switching to {}", target),
        })
    }
}

/// Normalize the enterprise header text the way the table keys are written
pub fn normalize_enterprise_label(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_at_target() {
        let transition = reconcile(Office::Aldeota, "DIGITALCOLLEGEALDEOTA-72546").unwrap();
        assert_eq!(transition.switch_code, None);
        assert_eq!(transition.message, "already at Aldeota");
    }

    #[test]
    fn test_switch_to_sul_from_aldeota() {
        let transition = reconcile(Office::Sul, "DIGITALCOLLEGEALDEOTA-72546").unwrap();
        assert_eq!(transition.switch_code, Some(3));
        assert_eq!(transition.message, "switching to Sul");
    }

    #[test]
    fn test_full_table() {
        for target in Office::ALL {
            for current in Office::ALL {
                let transition = reconcile(target, current.enterprise_label()).unwrap();
                if target == current {
                    assert_eq!(transition.switch_code, None);
                } else {
                    assert_eq!(transition.switch_code, Some(target.switch_code()));
                }
            }
        }
        assert_eq!(Office::Aldeota.switch_code(), 1);
        assert_eq!(Office::Bezerra.switch_code(), 4);
    }

    #[test]
    fn test_unrecognized_label() {
        assert_eq!(reconcile(Office::Sul, "OUTRAEMPRESA-1"), None);
        assert_eq!(reconcile(Office::Sul, ""), None);
    }

    #[test]
    fn test_normalize_enterprise_label() {
        assert_eq!(
            normalize_enterprise_label("  DIGITAL COLLEGE ALDEOTA - 72546\n"),
            "DIGITALCOLLEGEALDEOTA-72546"
        );
    }

    #[test]
    fn test_parse_office() {
        assert_eq!("sul".parse::<Office>().unwrap(), Office::Sul);
        assert_eq!(" Aldeota ".parse::<Office>().unwrap(), Office::Aldeota);
        assert!("Centro".parse::<Office>().is_err());
    }

    #[test]
    fn test_office_serde_uses_names() {
        let json = serde_json::to_string(&Office::Bezerra).unwrap();
        assert_eq!(json, "\"Bezerra\"");
        let office: Office = serde_json::from_str("\"Aldeota\"").unwrap();
        assert_eq!(office, Office::Aldeota);
    }
}
