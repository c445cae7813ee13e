use std::ffi::OsString;

use super::{request_config::unsafe_char, CsrError};

/// Ordered, non-empty list of domains. The first one is the common name,
/// every one of them ends up in the `subjectAltName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainList(Vec<String>);

impl DomainList {
    pub fn new(domains: Vec<String>) -> Result<Self, CsrError> {
        if domains.is_empty() {
            return Err(CsrError::InvalidInput(
                "at least one domain is required".into(),
            ));
        }
        for domain in &domains {
            check_domain(domain)?;
        }
        Ok(Self(domains))
    }

    /// Decodes command line domains as UTF-8, they need not be valid Unicode.
    pub fn from_os_strings(domains: Vec<OsString>) -> Result<Self, CsrError> {
        let domains = domains
            .into_iter()
            .enumerate()
            .map(|(index, domain)| {
                domain.into_string().map_err(|raw| CsrError::Encoding {
                    index,
                    lossy: raw.to_string_lossy().into_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(domains)
    }

    pub fn common_name(&self) -> &str {
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The `subjectAltName` value, `DNS:a,DNS:b,...` in input order.
    pub fn subject_alt_name(&self) -> String {
        self.iter()
            .map(|domain| format!("DNS:{domain}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn check_domain(domain: &str) -> Result<(), CsrError> {
    if domain.is_empty() {
        return Err(CsrError::InvalidInput("empty domain name".into()));
    }
    // commas would split the subjectAltName list
    let bad = domain
        .chars()
        .find(|c| c.is_whitespace() || *c == ',')
        .or_else(|| unsafe_char(domain));
    if let Some(bad) = bad {
        return Err(CsrError::InvalidInput(format!(
            "domain {domain:?} contains {bad:?}, which can't be written to the request config"
        )));
    }
    Ok(())
}
