//! Shipping address stored as a single delimited string.

use std::fmt;

/// Separator between the positional address components.
pub const ADDRESS_DELIMITER: &str = ", ";
const COMPONENTS: usize = 5;

/// Errors raised while building or parsing a [`ShippingAddress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShippingAddressError {
    /// A component contains the delimiter and would not survive a round trip.
    DelimiterInField { field: &'static str },
    /// The string has more parts than an address has components.
    ///
    /// Surplus parts are an error, never truncated; see "D2, address
    /// format" in DESIGN.md.
    TooManyParts { found: usize },
}

impl fmt::Display for ShippingAddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DelimiterInField { field } => {
                write!(f, "{field} must not contain \"{ADDRESS_DELIMITER}\"")
            }
            Self::TooManyParts { found } => write!(
                f,
                "shipping address has {found} parts; expected at most {COMPONENTS}"
            ),
        }
    }
}

impl std::error::Error for ShippingAddressError {}

/// Postal address attached to an order.
///
/// Components are positional: street, city, state, zip code, country.
/// Missing trailing components are empty strings.
///
/// # Examples
/// ```
/// use storefront::domain::ShippingAddress;
///
/// let address = ShippingAddress::parse("1 Main St, Springfield, IL").unwrap();
/// assert_eq!(address.city(), "Springfield");
/// assert_eq!(address.country(), "");
/// assert_eq!(address.to_string(), "1 Main St, Springfield, IL, , ");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingAddress {
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

impl ShippingAddress {
    /// Build an address from its components, trimming each one.
    pub fn new(
        street: &str,
        city: &str,
        state: &str,
        zip_code: &str,
        country: &str,
    ) -> Result<Self, ShippingAddressError> {
        Ok(Self {
            street: component(street, "street")?,
            city: component(city, "city")?,
            state: component(state, "state")?,
            zip_code: component(zip_code, "zip code")?,
            country: component(country, "country")?,
        })
    }

    /// Split a stored or submitted address string into its components.
    pub fn parse(raw: &str) -> Result<Self, ShippingAddressError> {
        let parts: Vec<&str> = raw.split(ADDRESS_DELIMITER).collect();
        if parts.len() > COMPONENTS {
            return Err(ShippingAddressError::TooManyParts { found: parts.len() });
        }
        let part = |index: usize| parts.get(index).copied().unwrap_or_default();
        Self::new(part(0), part(1), part(2), part(3), part(4))
    }

    pub fn street(&self) -> &str {
        self.street.as_str()
    }

    pub fn city(&self) -> &str {
        self.city.as_str()
    }

    pub fn state(&self) -> &str {
        self.state.as_str()
    }

    pub fn zip_code(&self) -> &str {
        self.zip_code.as_str()
    }

    pub fn country(&self) -> &str {
        self.country.as_str()
    }
}

impl fmt::Display for ShippingAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip_code.as_str(),
            self.country.as_str(),
        ];
        f.write_str(&parts.join(ADDRESS_DELIMITER))
    }
}

fn component(raw: &str, field: &'static str) -> Result<String, ShippingAddressError> {
    let trimmed = raw.trim();
    if trimmed.contains(ADDRESS_DELIMITER) {
        return Err(ShippingAddressError::DelimiterInField { field });
    }
    Ok(trimmed.to_owned())
}
