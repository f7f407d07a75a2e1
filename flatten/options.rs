/*!
This module defines the `Options` struct, which is used to configure [`flatten_with_options`](../fn.flatten_with_options.html).
*/

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Options {
	/// What to do when a model's per-iteration sequences differ in length. Defaults to `SequenceLengths::Strict`.
	pub sequence_lengths: Option<SequenceLengths>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub enum SequenceLengths {
	/// Fail with `Error::LengthMismatch`.
	#[serde(rename = "strict")]
	Strict,
	/// Emit rows only for the iterations present in every sequence.
	#[serde(rename = "truncate")]
	Truncate,
}

impl Default for SequenceLengths {
	fn default() -> Self {
		SequenceLengths::Strict
	}
}

#[test]
fn test_deserialize() {
	let options: Options = serde_json::from_str("{}").unwrap();
	assert_eq!(options.sequence_lengths.unwrap_or_default(), SequenceLengths::Strict);
	let options: Options = serde_json::from_str(r#"{"sequence_lengths": "truncate"}"#).unwrap();
	assert_eq!(options.sequence_lengths, Some(SequenceLengths::Truncate));
	assert!(serde_json::from_str::<Options>(r#"{"sequence_lengths": "pad"}"#).is_err());
}
