//! Session-present signal delivered on connection acknowledgement

use std::fmt;

use super::error::SessionError;

/// Broker session state reported when a connection is acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSignal {
	/// Broker kept no session; subscriptions must be reissued
	Fresh,
	/// Broker resumed the previous session with its subscriptions
	Resumed,
	/// Flag value outside the MQTT session-present set
	Unknown(u8),
}

impl SessionSignal {
	/// Interprets a raw session-present flag (`0` fresh, `1` resumed).
	pub fn from_session_present_flag(flag: u8) -> Self {
		match flag {
			| 0 => SessionSignal::Fresh,
			| 1 => SessionSignal::Resumed,
			| other => SessionSignal::Unknown(other),
		}
	}

	/// Fails for signals that are neither fresh nor resumed.
	pub fn check(self) -> Result<Self, SessionError> {
		match self {
			| SessionSignal::Unknown(flag) => {
				Err(SessionError::UnknownSessionState { flag })
			}
			| known => Ok(known),
		}
	}
}

impl From<bool> for SessionSignal {
	fn from(session_present: bool) -> Self {
		if session_present {
			SessionSignal::Resumed
		} else {
			SessionSignal::Fresh
		}
	}
}

impl fmt::Display for SessionSignal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			| SessionSignal::Fresh => f.write_str("fresh"),
			| SessionSignal::Resumed => f.write_str("resumed"),
			| SessionSignal::Unknown(flag) => write!(f, "unknown({flag})"),
		}
	}
}
