use super::errors::LockdownErrorKind;
use super::native::{LockdownConnector, NativeLockdown, PairRecord, ServiceDescriptor, SessionId};
use crate::codec::{self, Node};
use crate::config::BridgeConfig;
use crate::errors::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Options sent with [`LockdownClient::pair`].
pub const DEFAULT_PAIR_OPTIONS: &[(&str, bool)] = &[("ExtendedPairingErrors", true)];

/// Map a native output: the code must be success and the output present.
fn required<T>(result: Result<Option<T>, i32>, what: &str) -> Result<T> {
    result
        .map_err(LockdownErrorKind::rejected)?
        .ok_or_else(|| Error::internal(format!("lockdown {what} returned no result")))
}

/// Typed client over a native lockdown connection.
pub struct LockdownClient<N> {
    native: N,
}

impl<N: NativeLockdown> LockdownClient<N> {
    pub fn new(native: N) -> Self {
        Self { native }
    }

    /// Open a lockdown connection to `udid`, optionally performing the
    /// pairing handshake.
    pub fn connect<C>(connector: &C, udid: &str, label: Option<&str>, handshake: bool) -> Result<Self>
    where
        C: LockdownConnector<Connection = N>,
    {
        debug!(udid, label, handshake, "connecting to lockdown");
        let native = required(connector.connect(udid, label, handshake), "connect")?;
        Ok(Self::new(native))
    }

    /// Connect using the client label from `config`.
    pub fn connect_with_config<C>(
        connector: &C,
        udid: &str,
        config: &BridgeConfig,
        handshake: bool,
    ) -> Result<Self>
    where
        C: LockdownConnector<Connection = N>,
    {
        let label = config.label();
        Self::connect(connector, udid, Some(&label), handshake)
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    pub fn set_label(&self, label: Option<&str>) {
        self.native.set_label(label);
    }

    pub fn device_udid(&self) -> Result<String> {
        required(self.native.device_udid(), "device udid")
    }

    pub fn device_name(&self) -> Result<String> {
        required(self.native.device_name(), "device name")
    }

    /// The service type, `"com.apple.mobile.lockdown"` on a healthy device.
    pub fn query_type(&self) -> Result<String> {
        required(self.native.query_type(), "query type")
    }

    pub fn sync_data_classes(&self) -> Result<Vec<String>> {
        Ok(self
            .native
            .sync_data_classes()
            .map_err(LockdownErrorKind::rejected)?
            .unwrap_or_default())
    }

    /// Read a value. `None` for `domain` means the global domain, `None` for
    /// `key` reads the whole domain.
    pub fn value<T: DeserializeOwned>(&self, domain: Option<&str>, key: Option<&str>) -> Result<T> {
        let node = required(self.native.get_value(domain, key), "get value")?;
        codec::decode(node)
    }

    /// Write a value; `None` removes the key.
    pub fn set_value<T>(&self, domain: &str, key: &str, value: Option<&T>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        match value {
            Some(value) => {
                let node = codec::encode(value)?;
                debug!(domain, key, "setting lockdown value");
                LockdownErrorKind::check(self.native.set_value(domain, key, node))
            }
            None => {
                debug!(domain, key, "removing lockdown value");
                LockdownErrorKind::check(self.native.remove_value(domain, key))
            }
        }
    }

    pub fn start_service(&self, identifier: &str, escrow_bag: bool) -> Result<ServiceDescriptor> {
        let descriptor = required(
            self.native.start_service(identifier, escrow_bag),
            "start service",
        )?;
        debug!(
            service = identifier,
            port = descriptor.port,
            ssl = descriptor.ssl_enabled,
            "started service"
        );
        Ok(descriptor)
    }

    /// Open a session; the flag reports whether the connection switched to SSL.
    pub fn start_session(&self, host_id: &str) -> Result<(SessionId, bool)> {
        let (session, ssl) = required(self.native.start_session(host_id), "start session")?;
        debug!(session = %session, ssl, "lockdown session started");
        Ok((SessionId(session), ssl))
    }

    pub fn stop_session(&self, session: &SessionId) -> Result<()> {
        LockdownErrorKind::check(self.native.stop_session(session.as_str()))
    }

    /// Send a raw lockdown message.
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<()> {
        let node = codec::encode(message)?;
        LockdownErrorKind::check(self.native.send(&node))
    }

    pub fn receive<T: DeserializeOwned>(&self) -> Result<T> {
        let node = required(self.native.receive(), "receive")?;
        codec::decode(node)
    }

    /// Pair with [`DEFAULT_PAIR_OPTIONS`].
    pub fn pair<T: DeserializeOwned>(&self, record: Option<&PairRecord>) -> Result<T> {
        let options: serde_json::Map<String, Node> = DEFAULT_PAIR_OPTIONS
            .iter()
            .map(|&(key, value)| (key.to_string(), Node::Bool(value)))
            .collect();
        self.pair_with_options(record, &options)
    }

    pub fn pair_with_options<T, O>(&self, record: Option<&PairRecord>, options: &O) -> Result<T>
    where
        T: DeserializeOwned,
        O: Serialize + ?Sized,
    {
        let options = codec::encode(options)?;
        debug!(with_record = record.is_some(), "pairing");
        let response = required(self.native.pair(record, &options), "pair")?;
        codec::decode(response)
    }

    pub fn validate_pair(&self, record: &PairRecord) -> Result<()> {
        LockdownErrorKind::check(self.native.validate_pair(record))
    }

    pub fn unpair(&self, record: &PairRecord) -> Result<()> {
        LockdownErrorKind::check(self.native.unpair(record))
    }

    pub fn activate<T: Serialize + ?Sized>(&self, activation_record: &T) -> Result<()> {
        let node = codec::encode(activation_record)?;
        LockdownErrorKind::check(self.native.activate(&node))
    }

    pub fn deactivate(&self) -> Result<()> {
        LockdownErrorKind::check(self.native.deactivate())
    }

    pub fn enter_recovery(&self) -> Result<()> {
        LockdownErrorKind::check(self.native.enter_recovery())
    }

    pub fn goodbye(&self) -> Result<()> {
        LockdownErrorKind::check(self.native.goodbye())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeLockdown {
        values: Mutex<BTreeMap<String, Node>>,
        label: Mutex<Option<String>>,
        sent: Mutex<Vec<Node>>,
        pair_options: Mutex<Option<Node>>,
        deny_pairing: bool,
    }

    impl NativeLockdown for FakeLockdown {
        fn set_label(&self, label: Option<&str>) {
            *self.label.lock().unwrap() = label.map(String::from);
        }
        fn device_udid(&self) -> Result<Option<String>, i32> {
            Ok(Some("00008030-001A".into()))
        }
        fn device_name(&self) -> Result<Option<String>, i32> {
            Ok(None)
        }
        fn query_type(&self) -> Result<Option<String>, i32> {
            Ok(Some("com.apple.mobile.lockdown".into()))
        }
        fn sync_data_classes(&self) -> Result<Option<Vec<String>>, i32> {
            Ok(None)
        }
        fn get_value(&self, domain: Option<&str>, key: Option<&str>) -> Result<Option<Node>, i32> {
            let path = format!("{}/{}", domain.unwrap_or(""), key.unwrap_or(""));
            self.values
                .lock()
                .unwrap()
                .get(&path)
                .cloned()
                .map(Some)
                .ok_or(LockdownErrorKind::MissingValue.code())
        }
        fn set_value(&self, domain: &str, key: &str, value: Node) -> i32 {
            self.values
                .lock()
                .unwrap()
                .insert(format!("{domain}/{key}"), value);
            0
        }
        fn remove_value(&self, domain: &str, key: &str) -> i32 {
            match self.values.lock().unwrap().remove(&format!("{domain}/{key}")) {
                Some(_) => 0,
                None => LockdownErrorKind::MissingValue.code(),
            }
        }
        fn start_service(&self, identifier: &str, _: bool) -> Result<Option<ServiceDescriptor>, i32> {
            if identifier == "com.apple.unknown" {
                return Err(LockdownErrorKind::InvalidService.code());
            }
            Ok(Some(ServiceDescriptor {
                port: 49152,
                ssl_enabled: true,
            }))
        }
        fn start_session(&self, _: &str) -> Result<Option<(String, bool)>, i32> {
            Ok(Some(("session-1".into(), true)))
        }
        fn stop_session(&self, session_id: &str) -> i32 {
            if session_id == "session-1" {
                0
            } else {
                LockdownErrorKind::InvalidSessionId.code()
            }
        }
        fn send(&self, message: &Node) -> i32 {
            self.sent.lock().unwrap().push(message.clone());
            0
        }
        fn receive(&self) -> Result<Option<Node>, i32> {
            Ok(Some(json!({"Request": "QueryType", "Type": "com.apple.mobile.lockdown"})))
        }
        fn pair(&self, _: Option<&PairRecord>, options: &Node) -> Result<Option<Node>, i32> {
            *self.pair_options.lock().unwrap() = Some(options.clone());
            if self.deny_pairing {
                return Err(LockdownErrorKind::UserDeniedPairing.code());
            }
            Ok(Some(json!({"EscrowBag": "AAAA"})))
        }
        fn validate_pair(&self, _: &PairRecord) -> i32 {
            0
        }
        fn unpair(&self, _: &PairRecord) -> i32 {
            0
        }
        fn activate(&self, _: &Node) -> i32 {
            LockdownErrorKind::InvalidActivationRecord.code()
        }
        fn deactivate(&self) -> i32 {
            0
        }
        fn enter_recovery(&self) -> i32 {
            0
        }
        fn goodbye(&self) -> i32 {
            0
        }
    }

    struct Connector;

    impl LockdownConnector for Connector {
        type Connection = FakeLockdown;

        fn connect(
            &self,
            udid: &str,
            label: Option<&str>,
            _: bool,
        ) -> Result<Option<FakeLockdown>, i32> {
            if udid.is_empty() {
                return Err(LockdownErrorKind::MuxError.code());
            }
            let native = FakeLockdown::default();
            native.set_label(label);
            Ok(Some(native))
        }
    }

    fn expect_kind(err: Error, kind: LockdownErrorKind) {
        match err {
            Error::NativeRejected(native) => assert_eq!(native.code(), kind.code()),
            other => panic!("Expected NativeRejected({:?}), got {:?}", kind, other),
        }
    }

    #[test]
    fn test_connect_with_config_uses_label() {
        let mut config = BridgeConfig::default();
        config.client.label = Some("installer".into());
        let client =
            LockdownClient::connect_with_config(&Connector, "00008030-001A", &config, true)
                .unwrap();
        let label = client.native().label.lock().unwrap().clone().unwrap();
        assert!(!label.is_empty());
    }

    #[test]
    fn test_connect_failure_maps_code() {
        let err = LockdownClient::connect(&Connector, "", None, true)
            .err()
            .unwrap();
        expect_kind(err, LockdownErrorKind::MuxError);
    }

    #[test]
    fn test_identity_queries() {
        let client = LockdownClient::new(FakeLockdown::default());
        assert_eq!(client.device_udid().unwrap(), "00008030-001A");
        assert_eq!(client.query_type().unwrap(), "com.apple.mobile.lockdown");
        assert!(client.sync_data_classes().unwrap().is_empty());
        assert!(matches!(client.device_name(), Err(Error::Internal(_))));
    }

    #[test]
    fn test_set_value_round_trips_and_none_removes() {
        let client = LockdownClient::new(FakeLockdown::default());
        client
            .set_value("com.apple.mobile.wireless_lockdown", "EnableWifiConnections", Some(&true))
            .unwrap();
        let enabled: bool = client
            .value(
                Some("com.apple.mobile.wireless_lockdown"),
                Some("EnableWifiConnections"),
            )
            .unwrap();
        assert!(enabled);

        client
            .set_value::<bool>("com.apple.mobile.wireless_lockdown", "EnableWifiConnections", None)
            .unwrap();
        let err = client
            .value::<bool>(
                Some("com.apple.mobile.wireless_lockdown"),
                Some("EnableWifiConnections"),
            )
            .unwrap_err();
        expect_kind(err, LockdownErrorKind::MissingValue);
    }

    #[test]
    fn test_value_decode_failure() {
        let client = LockdownClient::new(FakeLockdown::default());
        client.set_value("d", "k", Some("text")).unwrap();
        assert!(matches!(
            client.value::<u32>(Some("d"), Some("k")),
            Err(Error::Decoding(_))
        ));
    }

    #[test]
    fn test_service_and_session() {
        let client = LockdownClient::new(FakeLockdown::default());
        let service = client
            .start_service(crate::instproxy::SERVICE_NAME, false)
            .unwrap();
        assert_eq!(service.port, 49152);
        assert!(service.ssl_enabled);
        expect_kind(
            client.start_service("com.apple.unknown", false).unwrap_err(),
            LockdownErrorKind::InvalidService,
        );

        let (session, ssl) = client.start_session("HOST-ID").unwrap();
        assert!(ssl);
        client.stop_session(&session).unwrap();
        expect_kind(
            client
                .stop_session(&SessionId("other".into()))
                .unwrap_err(),
            LockdownErrorKind::InvalidSessionId,
        );
    }

    #[test]
    fn test_pair_sends_default_options() {
        let client = LockdownClient::new(FakeLockdown::default());
        let response: BTreeMap<String, String> = client.pair(None).unwrap();
        assert_eq!(response["EscrowBag"], "AAAA");
        assert_eq!(
            client.native().pair_options.lock().unwrap().clone(),
            Some(json!({"ExtendedPairingErrors": true}))
        );
    }

    #[test]
    fn test_pair_denied() {
        let client = LockdownClient::new(FakeLockdown {
            deny_pairing: true,
            ..Default::default()
        });
        let err = client.pair::<Node>(Some(&PairRecord::default())).unwrap_err();
        expect_kind(err, LockdownErrorKind::UserDeniedPairing);
    }

    #[test]
    fn test_send_receive_and_control() {
        let client = LockdownClient::new(FakeLockdown::default());
        client.send(&json!({"Request": "QueryType"})).unwrap();
        assert_eq!(client.native().sent.lock().unwrap().len(), 1);

        let reply: BTreeMap<String, String> = client.receive().unwrap();
        assert_eq!(reply["Type"], "com.apple.mobile.lockdown");

        let record = PairRecord::default();
        client.validate_pair(&record).unwrap();
        client.unpair(&record).unwrap();
        client.deactivate().unwrap();
        client.enter_recovery().unwrap();
        client.goodbye().unwrap();
        expect_kind(
            client.activate(&json!({})).unwrap_err(),
            LockdownErrorKind::InvalidActivationRecord,
        );
    }

    #[test]
    fn test_pair_record_field_names() {
        let record = PairRecord {
            host_id: Some("HOST".into()),
            system_buid: Some("BUID".into()),
            ..Default::default()
        };
        let node = codec::encode(&record).unwrap();
        assert_eq!(node["HostID"], "HOST");
        assert_eq!(node["SystemBUID"], "BUID");
        assert!(node.get("DeviceCertificate").is_some());
    }
}
