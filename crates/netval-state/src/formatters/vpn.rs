//! `vpn` feature: ASA site-to-site tunnels and AnyConnect sessions.

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, RecordExt, StateMap,
    StateMapExt, StateValue,
};

use super::{put_non_empty, require_dialect};

/// `show vpn-sessiondb l2l` fields.
mod l2l_fields {
    pub const NAME: &str = "CONNECTION";
    pub const PEER_IP: &str = "IP_ADDRESS";
    pub const PROTOCOL: &str = "PROTOCOL";
    pub const ENCRYPTION: &str = "ENCRYPTION";
    pub const TX: &str = "BYTES_TX";
    pub const RX: &str = "BYTES_RX";
}

/// `show vpn-sessiondb anyconnect` fields.
mod anyconnect_fields {
    pub const USER: &str = "USERNAME";
    pub const PUBLIC_IP: &str = "PUBLIC_IP";
}

/// Formatter for the `vpn` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct VpnFormatter;

impl FeatureFormatter for VpnFormatter {
    fn feature(&self) -> &'static str {
        "vpn"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["sts_peer", "ac_user"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        if !self.supports(sub_feature) {
            return Err(FormatError::UnsupportedSubFeature);
        }
        require_dialect(input.dialect, &[Dialect::Asa])?;
        match sub_feature {
            "sts_peer" => sts_peer(input),
            _ => ac_user(input),
        }
    }
}

fn sts_peer(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use l2l_fields::*;
    let mut root = StateMap::new();
    for record in input.output.records()? {
        let entry = root.child_map(record.field(PEER_IP)?);
        put_non_empty(entry, "name", &record.field(NAME)?);
        put_non_empty(entry, "protocol", &record.field_or(PROTOCOL, ""));
        put_non_empty(entry, "encryption", &record.field_or(ENCRYPTION, ""));
        if input.mode == Mode::Actual {
            put_non_empty(entry, "tx", &record.field_or(TX, ""));
            put_non_empty(entry, "rx", &record.field_or(RX, ""));
        }
    }
    Ok(root.into())
}

/// A user with several sessions is listed once, under the address of its
/// last session; `user_count` counts sessions.
fn ac_user(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use anyconnect_fields::*;
    let records = input.output.records()?;
    let mut root = StateMap::new();
    root.put("user_count", records.len());
    if input.mode == Mode::Actual {
        let users = root.child_map("users");
        for record in records {
            let entry = users.child_map(record.field(USER)?);
            put_non_empty(entry, "public_ip", &record.field_or(PUBLIC_IP, ""));
        }
    }
    Ok(root.into())
}
