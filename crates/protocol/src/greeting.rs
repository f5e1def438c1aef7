//! The banner a node sends as soon as a control connection opens.

/// Parsed greeting payload, e.g. `streamblocks 1.0`.
///
/// Older nodes send an empty payload, so both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Greeting {
	pub product: Option<String>,
	pub version: Option<String>,
	/// Payload exactly as received (trimmed).
	pub raw: String,
}

impl Greeting {
	pub fn parse(payload: &str) -> Self {
		let raw = payload.trim().to_string();
		let mut tokens = raw.split_whitespace();
		let product = tokens.next().map(str::to_string);
		let version = tokens.next().map(str::to_string);
		Self {
			product,
			version,
			raw,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_product_and_version() {
		let g = Greeting::parse("streamblocks 1.0");
		assert_eq!(g.product.as_deref(), Some("streamblocks"));
		assert_eq!(g.version.as_deref(), Some("1.0"));
	}

	#[test]
	fn empty_greeting_has_no_version() {
		let g = Greeting::parse("");
		assert_eq!(g, Greeting::default());
	}
}
