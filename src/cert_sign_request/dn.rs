use std::collections::BTreeMap;

use email_address_parser::EmailAddress;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{request_config::unsafe_char, CsrError};

/// Snapshot of the process environment, taken once per run.
pub type EnvMap = BTreeMap<String, String>;

/// The distinguished name fields the request config carries defaults for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnField {
    Country,
    Province,
    City,
    Organization,
    OrganizationalUnit,
    Email,
}

impl DnField {
    pub const ALL: [DnField; 6] = [
        DnField::Country,
        DnField::Province,
        DnField::City,
        DnField::Organization,
        DnField::OrganizationalUnit,
        DnField::Email,
    ];

    /// Environment variable the field is read from and handed to the engine as.
    pub fn env_var(self) -> &'static str {
        match self {
            DnField::Country => "REQ_COUNTRY",
            DnField::Province => "REQ_PROVINCE",
            DnField::City => "REQ_CITY",
            DnField::Organization => "REQ_ORG",
            DnField::OrganizationalUnit => "REQ_OU",
            DnField::Email => "REQ_EMAIL",
        }
    }

    /// Attribute name in the `req_distinguished_name` section.
    pub fn config_name(self) -> &'static str {
        match self {
            DnField::Country => "countryName",
            DnField::Province => "stateOrProvinceName",
            DnField::City => "localityName",
            DnField::Organization => "0.organizationName",
            DnField::OrganizationalUnit => "organizationalUnitName",
            DnField::Email => "emailAddress",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            DnField::Country => "Country Name (2 letter code)",
            DnField::Province => "State or Province Name (full name)",
            DnField::City => "Locality Name (eg, city)",
            DnField::Organization => "Organization Name (eg, company)",
            DnField::OrganizationalUnit => {
                "Organizational Unit Name (eg, section)"
            }
            DnField::Email => "Email Address",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DN {
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub email: Option<String>,
}

impl DN {
    /// Defaults used when neither config, environment nor arguments say otherwise.
    pub fn builtin() -> Self {
        Self {
            country: Some("XX".into()),
            ..Default::default()
        }
    }

    /// Reads the `REQ_*` variables out of an environment snapshot.
    pub fn from_env(env: &EnvMap) -> Self {
        let mut dn = Self::default();
        for field in DnField::ALL {
            *dn.slot(field) = env.get(field.env_var()).cloned();
        }
        dn
    }

    /// Non-empty value of `field`, if any.
    pub fn get(&self, field: DnField) -> Option<&str> {
        let value = match field {
            DnField::Country => &self.country,
            DnField::Province => &self.province,
            DnField::City => &self.city,
            DnField::Organization => &self.organization,
            DnField::OrganizationalUnit => &self.organizational_unit,
            DnField::Email => &self.email,
        };
        value.as_deref().filter(|value| !value.is_empty())
    }

    fn slot(&mut self, field: DnField) -> &mut Option<String> {
        match field {
            DnField::Country => &mut self.country,
            DnField::Province => &mut self.province,
            DnField::City => &mut self.city,
            DnField::Organization => &mut self.organization,
            DnField::OrganizationalUnit => &mut self.organizational_unit,
            DnField::Email => &mut self.email,
        }
    }

    /// Returns `self` with every non-empty field of `other` laid over it.
    pub fn overlay(mut self, other: &DN) -> Self {
        for field in DnField::ALL {
            if let Some(value) = other.get(field) {
                *self.slot(field) = Some(value.to_owned());
            }
        }
        self
    }

    /// Merges the layers, later ones winning: built-in defaults, config
    /// file defaults, environment, explicit arguments.
    pub fn resolve(config_defaults: &DN, env: &EnvMap, explicit: &DN) -> Self {
        Self::builtin()
            .overlay(config_defaults)
            .overlay(&Self::from_env(env))
            .overlay(explicit)
    }

    /// The environment the engine runs with: the snapshot plus every
    /// `REQ_*` variable set to its resolved value, empty when absent.
    pub fn engine_env(&self, env: &EnvMap) -> EnvMap {
        let mut merged = env.clone();
        for field in DnField::ALL {
            merged.insert(
                field.env_var().to_owned(),
                self.get(field).unwrap_or_default().to_owned(),
            );
        }
        merged
    }

    /// Rejects values the config parser would cut short, expand or split
    /// into extra directives.
    pub fn check_config_safe(&self) -> Result<(), CsrError> {
        for field in DnField::ALL {
            let Some(value) = self.get(field) else {
                continue;
            };
            if let Some(bad) = unsafe_char(value) {
                return Err(CsrError::InvalidInput(format!(
                    "{} {value:?} contains {bad:?}, which can't be written to the request config",
                    field.env_var()
                )));
            }
        }
        Ok(())
    }

    /// Logs values the engine is likely to reject or mangle.
    pub fn warn_on_suspicious_values(&self) {
        if let Some(country) = self.get(DnField::Country) {
            if country.chars().count() != 2 {
                warn!(country, "country code should be exactly two characters");
            }
        }
        if let Some(email) = self.get(DnField::Email) {
            if !EmailAddress::is_valid(email, None) {
                warn!(email, "email address does not look valid");
            }
        }
    }
}
