//! Renders the openssl `req` configuration used to build the request.

use std::io::{self, Write};

use super::{
    dn::{DnField, DN},
    san::DomainList,
};

/// Name of the extension section holding the subject alt names.
pub const SAN_SECTION: &str = "SAN";

/// Characters the openssl config parser gives meaning to inside a value:
/// comments, variable expansion, escapes and quoting.
const RESERVED: &[char] = &['#', '$', '\\', '"', '\''];

/// First character of `value` that can't be written verbatim into the config.
pub fn unsafe_char(value: &str) -> Option<char> {
    value
        .chars()
        .find(|c| c.is_control() || RESERVED.contains(c))
}

const PREAMBLE: &str = "\
[ req ]
default_bits\t\t= 2048
default_md\t\t= sha256
default_keyfile\t\t= privkey.pem
distinguished_name\t= req_distinguished_name
x509_extensions\t\t= v3_ca
string_mask\t\t= utf8only

[ v3_ca ]
subjectKeyIdentifier\t= hash
authorityKeyIdentifier\t= keyid:always,issuer
basicConstraints\t= CA:true

[ req_distinguished_name ]
";

/// Writes the full configuration for `dn` and `domains` to `out`.
pub fn write_request_config<W: Write>(
    out: &mut W,
    dn: &DN,
    domains: &DomainList,
) -> io::Result<()> {
    out.write_all(PREAMBLE.as_bytes())?;

    for field in DnField::ALL {
        if field == DnField::Email {
            // the subject lists the common name before the email address
            writeln!(
                out,
                "commonName\t\t= Common Name (eg, your name or your server's hostname)"
            )?;
            writeln!(out, "commonName_max\t\t= 64")?;
            writeln!(out)?;
        }
        write_field(out, dn, field)?;
    }

    writeln!(out, "commonName_default={}", domains.common_name())?;
    writeln!(out)?;
    writeln!(out, "[{SAN_SECTION}]")?;
    writeln!(out, "subjectAltName={}", domains.subject_alt_name())?;
    out.flush()
}

fn write_field<W: Write>(out: &mut W, dn: &DN, field: DnField) -> io::Result<()> {
    let name = field.config_name();
    writeln!(out, "{name}\t\t= {}", field.prompt())?;
    if let Some(value) = dn.get(field) {
        writeln!(out, "{name}_default={value}")?;
    }
    match field {
        DnField::Country => {
            writeln!(out, "{name}_min\t\t= 2")?;
            writeln!(out, "{name}_max\t\t= 2")?;
        }
        DnField::Email => writeln!(out, "{name}_max\t\t= 64")?,
        _ => {}
    }
    writeln!(out)
}
