use std::convert::TryFrom;
use thiserror::Error;

const CNN: &str = "CNN";
const DEEP_CONV_LSTM: &str = "DeepConvLSTM";
const RES_NET: &str = "ResNet";
const INCEPTION_TIME: &str = "InceptionTime";

/// An `Architecture` is keyed on the `modeltype` field of a model record and carries only the fields that the model type needs. Model types this crate does not know about are kept as `Other` with their name intact.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawArchitecture", into = "RawArchitecture")]
pub enum Architecture {
	Cnn {
		/// One entry per convolutional layer.
		filters: Vec<u64>,
	},
	DeepConvLstm {
		/// One entry per convolutional layer.
		filters: Vec<u64>,
		/// One entry per recurrent layer.
		lstm_dims: Vec<u64>,
	},
	ResNet {
		network_depth: usize,
	},
	InceptionTime {
		network_depth: usize,
	},
	Other {
		modeltype: String,
	},
}

impl Architecture {
	/// The `modeltype` tag as it appears in the training history.
	pub fn modeltype(&self) -> &str {
		match self {
			Self::Cnn { .. } => CNN,
			Self::DeepConvLstm { .. } => DEEP_CONV_LSTM,
			Self::ResNet { .. } => RES_NET,
			Self::InceptionTime { .. } => INCEPTION_TIME,
			Self::Other { modeltype } => modeltype,
		}
	}

	/// The number of layers in the network, or `None` if the model type is unknown or the layer count does not fit in a `usize`.
	pub fn nr_layers(&self) -> Option<usize> {
		match self {
			Self::Cnn { filters } => Some(filters.len()),
			Self::DeepConvLstm { filters, lstm_dims } => Some(filters.len() + lstm_dims.len()),
			// Each residual block has three convolutional layers.
			Self::ResNet { network_depth } => network_depth.checked_mul(3),
			Self::InceptionTime { network_depth } => network_depth.checked_mul(2),
			Self::Other { .. } => None,
		}
	}
}

#[derive(Debug, Error)]
#[error("model type \"{modeltype}\" requires the field \"{field}\"")]
pub struct MissingArchitectureField {
	pub modeltype: String,
	pub field: &'static str,
}

/// The flat shape of the architecture fields in a model record.
#[derive(serde::Serialize, serde::Deserialize)]
struct RawArchitecture {
	modeltype: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	filters: Option<Vec<u64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	lstm_dims: Option<Vec<u64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	network_depth: Option<usize>,
}

impl TryFrom<RawArchitecture> for Architecture {
	type Error = MissingArchitectureField;
	fn try_from(raw: RawArchitecture) -> Result<Self, Self::Error> {
		let RawArchitecture {
			modeltype,
			filters,
			lstm_dims,
			network_depth,
		} = raw;
		let architecture = match modeltype.as_str() {
			CNN => Self::Cnn {
				filters: required(filters, &modeltype, "filters")?,
			},
			DEEP_CONV_LSTM => Self::DeepConvLstm {
				filters: required(filters, &modeltype, "filters")?,
				lstm_dims: required(lstm_dims, &modeltype, "lstm_dims")?,
			},
			RES_NET => Self::ResNet {
				network_depth: required(network_depth, &modeltype, "network_depth")?,
			},
			INCEPTION_TIME => Self::InceptionTime {
				network_depth: required(network_depth, &modeltype, "network_depth")?,
			},
			_ => Self::Other { modeltype },
		};
		Ok(architecture)
	}
}

impl From<Architecture> for RawArchitecture {
	fn from(architecture: Architecture) -> Self {
		let modeltype = architecture.modeltype().to_owned();
		let mut raw = RawArchitecture {
			modeltype,
			filters: None,
			lstm_dims: None,
			network_depth: None,
		};
		match architecture {
			Architecture::Cnn { filters } => raw.filters = Some(filters),
			Architecture::DeepConvLstm { filters, lstm_dims } => {
				raw.filters = Some(filters);
				raw.lstm_dims = Some(lstm_dims);
			}
			Architecture::ResNet { network_depth }
			| Architecture::InceptionTime { network_depth } => raw.network_depth = Some(network_depth),
			Architecture::Other { .. } => {}
		}
		raw
	}
}

fn required<T>(
	value: Option<T>,
	modeltype: &str,
	field: &'static str,
) -> Result<T, MissingArchitectureField> {
	value.ok_or_else(|| MissingArchitectureField {
		modeltype: modeltype.to_owned(),
		field,
	})
}

#[test]
fn test_nr_layers() {
	let cnn = Architecture::Cnn {
		filters: vec![32, 32, 64, 64],
	};
	assert_eq!(cnn.nr_layers(), Some(4));
	let deep_conv_lstm = Architecture::DeepConvLstm {
		filters: vec![32, 32, 64],
		lstm_dims: vec![16, 16],
	};
	assert_eq!(deep_conv_lstm.nr_layers(), Some(5));
	let res_net = Architecture::ResNet { network_depth: 5 };
	assert_eq!(res_net.nr_layers(), Some(15));
	let inception_time = Architecture::InceptionTime { network_depth: 6 };
	assert_eq!(inception_time.nr_layers(), Some(12));
	let mlp = Architecture::Other {
		modeltype: "MLP".to_owned(),
	};
	assert_eq!(mlp.nr_layers(), None);
	assert_eq!(mlp.modeltype(), "MLP");
}

#[test]
fn test_nr_layers_overflow() {
	let res_net = Architecture::ResNet {
		network_depth: usize::MAX / 2,
	};
	assert_eq!(res_net.nr_layers(), None);
	let inception_time = Architecture::InceptionTime {
		network_depth: usize::MAX,
	};
	assert_eq!(inception_time.nr_layers(), None);
	let inception_time = Architecture::InceptionTime {
		network_depth: usize::MAX / 2,
	};
	assert_eq!(inception_time.nr_layers(), Some(usize::MAX - 1));
}

#[test]
fn test_unknown_modeltype_is_kept() {
	let architecture: Architecture =
		serde_json::from_str(r#"{"modeltype": "ABC", "filters": [1, 1], "fc_hidden_nodes": 1}"#)
			.unwrap();
	assert_eq!(
		architecture,
		Architecture::Other {
			modeltype: "ABC".to_owned()
		}
	);
}

#[test]
fn test_missing_architecture_field() {
	let error = serde_json::from_str::<Architecture>(r#"{"modeltype": "DeepConvLSTM", "filters": [1]}"#)
		.unwrap_err();
	assert!(error
		.to_string()
		.contains("model type \"DeepConvLSTM\" requires the field \"lstm_dims\""));
	let error = serde_json::from_str::<Architecture>(r#"{"modeltype": "ResNet"}"#).unwrap_err();
	assert!(error.to_string().contains("\"network_depth\""));
}

#[test]
fn test_serialize_flat_shape() {
	let architecture = Architecture::DeepConvLstm {
		filters: vec![8],
		lstm_dims: vec![4, 4],
	};
	let value = serde_json::to_value(&architecture).unwrap();
	assert_eq!(
		value,
		serde_json::json!({
			"modeltype": "DeepConvLSTM",
			"filters": [8],
			"lstm_dims": [4, 4]
		})
	);
}
