//! Configuration for endpoint connections

use std::time::Duration;

use rumqttc::Transport;
use rumqttc::v5::MqttOptions;

/// Client identity and local queueing
#[derive(Debug, Clone)]
pub struct ClientOptions {
	/// MQTT client identifier
	pub client_id: String,
	/// Capacity of the request channel between client handle and event
	/// loop. Must hold at least one subscribe request per subscription.
	pub request_channel_capacity: usize,
}

impl ClientOptions {
	/// Creates options with the default channel capacity.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			request_channel_capacity: 100,
		}
	}
}

/// Username and password authentication
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
	/// Username sent in CONNECT
	pub username: String,
	/// Password sent in CONNECT
	pub password: String,
}

impl PasswordCredentials {
	/// Creates credentials.
	pub fn new(
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self {
			username: username.into(),
			password: password.into(),
		}
	}
}

impl std::fmt::Debug for PasswordCredentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PasswordCredentials")
			.field("username", &self.username)
			.field("password", &"***")
			.finish()
	}
}

/// How the broker session is started on each connection attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStart {
	/// Always discard the broker session
	Clean,
	/// Clean start for the first connection, resume on reconnects
	#[default]
	FirstOnly,
	/// Always try to resume the broker session
	Resume,
}

impl SessionStart {
	/// Clean start flag for the first connection attempt
	pub fn initial_clean_start(self) -> bool {
		!matches!(self, SessionStart::Resume)
	}
}

/// Broker address and session behaviour
#[derive(Debug, Clone)]
pub struct ServerOptions {
	/// Broker hostname or IP address
	pub host: String,
	/// Broker port
	pub port: u16,
	/// Keep alive interval
	pub keep_alive: Duration,
	/// Session start policy
	pub session_start: SessionStart,
	/// How long the broker keeps the session after disconnect
	pub session_expiry: Option<Duration>,
}

impl ServerOptions {
	/// Creates options for `host:port` with defaults.
	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self {
			host: host.into(),
			port,
			keep_alive: Duration::from_secs(60),
			session_start: SessionStart::default(),
			session_expiry: None,
		}
	}
}

impl Default for ServerOptions {
	fn default() -> Self {
		Self::new("localhost", 1883)
	}
}

/// Configuration for endpoint creation
#[derive(Debug, Clone)]
pub struct EndpointConfig {
	/// Client identity and queueing
	pub client: ClientOptions,
	/// Optional username/password authentication
	pub credentials: Option<PasswordCredentials>,
	/// Broker address and session behaviour
	pub server: ServerOptions,
	/// Connect over TLS using the default root certificates
	pub use_tls: bool,
}

impl EndpointConfig {
	/// Create config with default settings
	///
	/// # Example
	/// ```rust
	/// use mqtt_endpoint::EndpointConfig;
	///
	/// let config = EndpointConfig::new("door-1", "broker.hivemq.com", 1883);
	/// assert_eq!(config.server.port, 1883);
	/// assert!(!config.use_tls);
	/// ```
	pub fn new(
		client_id: impl Into<String>,
		host: impl Into<String>,
		port: u16,
	) -> Self {
		Self {
			client: ClientOptions::new(client_id),
			credentials: None,
			server: ServerOptions::new(host, port),
			use_tls: false,
		}
	}

	/// Create config for localhost:1883
	pub fn localhost(client_id: impl Into<String>) -> Self {
		Self::new(client_id, "localhost", 1883)
	}

	/// Sets username/password authentication.
	pub fn with_credentials(
		mut self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		self.credentials = Some(PasswordCredentials::new(username, password));
		self
	}

	/// Enables or disables TLS.
	pub fn with_tls(mut self, use_tls: bool) -> Self {
		self.use_tls = use_tls;
		self
	}

	/// Sets the keep alive interval.
	pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
		self.server.keep_alive = keep_alive;
		self
	}

	/// Sets the session start policy.
	pub fn with_session_start(mut self, session_start: SessionStart) -> Self {
		self.server.session_start = session_start;
		self
	}

	/// Sets the broker session expiry.
	pub fn with_session_expiry(mut self, expiry: Duration) -> Self {
		self.server.session_expiry = Some(expiry);
		self
	}

	/// Sets the request channel capacity.
	pub fn with_request_channel_capacity(mut self, capacity: usize) -> Self {
		self.client.request_channel_capacity = capacity;
		self
	}

	/// Builds MQTT v5 connection options for the first connection attempt.
	pub fn to_mqtt_options(&self) -> MqttOptions {
		let mut options = MqttOptions::new(
			self.client.client_id.clone(),
			self.server.host.clone(),
			self.server.port,
		);
		options.set_keep_alive(self.server.keep_alive);
		let clean_start = self.server.session_start.initial_clean_start();
		options.set_clean_start(clean_start);
		if let Some(expiry) = self.server.session_expiry {
			let secs = u32::try_from(expiry.as_secs()).unwrap_or(u32::MAX);
			let mut props = options
				.connect_properties()
				.unwrap_or_else(rumqttc::v5::mqttbytes::v5::ConnectProperties::new);
			props.session_expiry_interval = Some(secs);
			options.set_connect_properties(props);
		}
		if let Some(credentials) = &self.credentials {
			options.set_credentials(
				credentials.username.clone(),
				credentials.password.clone(),
			);
		}
		if self.use_tls {
			options.set_transport(Transport::tls_with_default_config());
		}
		options
	}
}
