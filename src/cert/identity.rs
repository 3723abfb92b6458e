//! Subject identity fields.
//!
//! An [`Identity`] holds the distinguished name fields of a request. Only the
//! common name is mandatory; optional fields that are absent or empty are left
//! out of the subject entirely rather than encoded as empty strings.

use crate::error::{CsrError, Result};
use const_oid::ObjectIdentifier;

/// PKCS#9 emailAddress (1.2.840.113549.1.9.1).
pub const EMAIL_ADDRESS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

/// A distinguished name attribute this crate knows how to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnField {
    CommonName,
    Organization,
    OrganizationalUnit,
    Locality,
    State,
    Country,
    EmailAddress,
}

impl DnField {
    /// Subject order used when building a request.
    pub const ORDER: [DnField; 7] = [
        DnField::CommonName,
        DnField::Organization,
        DnField::OrganizationalUnit,
        DnField::Locality,
        DnField::State,
        DnField::Country,
        DnField::EmailAddress,
    ];

    pub fn oid(self) -> ObjectIdentifier {
        use const_oid::db::rfc4519;

        match self {
            DnField::CommonName => rfc4519::CN,
            DnField::Organization => rfc4519::O,
            DnField::OrganizationalUnit => rfc4519::OU,
            DnField::Locality => rfc4519::L,
            DnField::State => rfc4519::ST,
            DnField::Country => rfc4519::C,
            DnField::EmailAddress => EMAIL_ADDRESS,
        }
    }

    /// Conventional short label, e.g. `CN` or `emailAddress`.
    pub fn short_name(self) -> &'static str {
        match self {
            DnField::CommonName => "CN",
            DnField::Organization => "O",
            DnField::OrganizationalUnit => "OU",
            DnField::Locality => "L",
            DnField::State => "ST",
            DnField::Country => "C",
            DnField::EmailAddress => "emailAddress",
        }
    }

    /// Name of the [`Identity`] field, used in error reports.
    pub fn field_name(self) -> &'static str {
        match self {
            DnField::CommonName => "common_name",
            DnField::Organization => "organization_name",
            DnField::OrganizationalUnit => "organization_unit_name",
            DnField::Locality => "city_name",
            DnField::State => "state_name",
            DnField::Country => "country_code",
            DnField::EmailAddress => "email_address",
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<DnField> {
        DnField::ORDER.into_iter().find(|field| field.oid() == *oid)
    }
}

/// Identity claims placed in the request subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub common_name: String,
    pub organization_name: Option<String>,
    pub organization_unit_name: Option<String>,
    pub city_name: Option<String>,
    pub state_name: Option<String>,
    /// Two-letter uppercase country code, e.g. `US`.
    pub country_code: Option<String>,
    pub email_address: Option<String>,
}

impl Identity {
    /// Create an identity with only a common name.
    ///
    /// # Example
    ///
    /// ```
    /// use csrgen::cert::identity::Identity;
    ///
    /// let identity = Identity::new("example.com")
    ///     .organization("Acme")
    ///     .country("US");
    /// assert_eq!(identity.attributes().len(), 3);
    /// ```
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            ..Self::default()
        }
    }

    pub fn organization(mut self, value: impl Into<String>) -> Self {
        self.organization_name = Some(value.into());
        self
    }

    pub fn organizational_unit(mut self, value: impl Into<String>) -> Self {
        self.organization_unit_name = Some(value.into());
        self
    }

    pub fn city(mut self, value: impl Into<String>) -> Self {
        self.city_name = Some(value.into());
        self
    }

    pub fn state(mut self, value: impl Into<String>) -> Self {
        self.state_name = Some(value.into());
        self
    }

    pub fn country(mut self, value: impl Into<String>) -> Self {
        self.country_code = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email_address = Some(value.into());
        self
    }

    /// Present attributes in subject order. Empty optional fields are skipped.
    pub fn attributes(&self) -> Vec<(DnField, &str)> {
        DnField::ORDER
            .into_iter()
            .filter_map(|field| self.value(field).map(|value| (field, value)))
            .collect()
    }

    fn value(&self, field: DnField) -> Option<&str> {
        let value = match field {
            DnField::CommonName => Some(&self.common_name),
            DnField::Organization => self.organization_name.as_ref(),
            DnField::OrganizationalUnit => self.organization_unit_name.as_ref(),
            DnField::Locality => self.city_name.as_ref(),
            DnField::State => self.state_name.as_ref(),
            DnField::Country => self.country_code.as_ref(),
            DnField::EmailAddress => self.email_address.as_ref(),
        };

        value.map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Check the fields that carry syntax rules.
    pub fn validate(&self) -> Result<()> {
        if self.common_name.trim().is_empty() {
            return Err(CsrError::invalid_field(
                DnField::CommonName.field_name(),
                "must not be empty",
            ));
        }

        if let Some(country) = self.value(DnField::Country) {
            if country.len() != 2 || !country.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(CsrError::invalid_field(
                    DnField::Country.field_name(),
                    format!("expected two uppercase letters, got '{}'", country),
                ));
            }
        }

        if let Some(email) = self.value(DnField::EmailAddress) {
            if !email.is_ascii() {
                return Err(CsrError::invalid_field(
                    DnField::EmailAddress.field_name(),
                    "must be ASCII",
                ));
            }
        }

        Ok(())
    }
}
