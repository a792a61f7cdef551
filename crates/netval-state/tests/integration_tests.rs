//! Integration tests for the normalization engine
//!
//! Exercises the full path from collected command output through the
//! built-in formatter registry to the canonical state tree:
//! - Idempotence and validation/actual mode superset across dialects
//! - ACL remark elimination and route next-hop merging
//! - Subnetted prefix repair and NX-OS singleton repair
//! - Empty output, dialect substring matching and error policies

use netval_common::{state_map, CommandOutput, Dialect, Mode, StateKey, StateValue};
use netval_state::{DeviceDocument, ErrorPolicy, FormatterRegistry, Normalizer};
use netval_test::{asa, assert_mode_superset, empty_output, ios, nxos, viptela, wlc, DeviceOutputs};
use pretty_assertions::assert_eq;

/// One sub-feature's output for one dialect
struct Case {
    dialect: &'static str,
    feature: &'static str,
    sub_feature: &'static str,
    output: CommandOutput,
}

fn case(
    dialect: &'static str,
    feature: &'static str,
    sub_feature: &'static str,
    output: CommandOutput,
) -> Case {
    Case {
        dialect,
        feature,
        sub_feature,
        output,
    }
}

fn all_cases() -> Vec<Case> {
    vec![
        case(ios::DIALECT, "system", "image", ios::show_version()),
        case(ios::DIALECT, "system", "acl", ios::access_list_with_remarks()),
        case(ios::DIALECT, "interface", "intf", ios::interface_status()),
        case(ios::DIALECT, "layer2", "mac_table", ios::mac_address_count()),
        case(ios::DIALECT, "route_table", "route", ios::route_text()),
        case(ios::DIALECT, "route_table", "route_count", ios::route_text()),
        case(ios::DIALECT, "route_table", "route", ios::route_records_repeating_hop()),
        case(ios::DIALECT, "route_protocol", "bgp_peer", ios::bgp_summary()),
        case(ios::DIALECT, "sla", "ip_sla", ios::ip_sla_summary()),
        case(nxos::DIALECT, "system", "acl", nxos::access_list_with_remark()),
        case(nxos::DIALECT, "route_protocol", "bgp_peer", nxos::bgp_summary_singleton()),
        case(nxos::DIALECT, "intf_bonded", "port_channel", nxos::port_channel_summary()),
        case(nxos::DIALECT, "evpn", "nve_vni", nxos::nve_vnis()),
        case(nxos::DIALECT, "evpn", "nve_peer", nxos::nve_peers()),
        case(nxos::DIALECT, "evpn", "mac_ip", nxos::mac_ip_routes()),
        case(asa::DIALECT, "route_table", "route", asa::route_records()),
        case(asa::DIALECT, "interface", "intf", asa::interfaces()),
        case(asa::DIALECT, "vpn", "ac_user", asa::anyconnect_sessions()),
        case(asa::DIALECT, "vpn", "sts_peer", asa::l2l_sessions()),
        case(wlc::DIALECT, "wifi", "wlan", wlc::wlan_summary()),
        case(wlc::DIALECT, "wifi", "client_count", wlc::client_summary()),
        case(viptela::DIALECT, "sdwan", "bfd", viptela::bfd_sessions()),
        case(viptela::DIALECT, "sla", "tracker", viptela::endpoint_trackers()),
    ]
}

fn normalize(case: &Case, mode: Mode) -> StateValue {
    Normalizer::with_builtin(case.dialect, mode)
        .normalize_sub_feature(case.feature, case.sub_feature, Some(&case.output))
        .unwrap_or_else(|e| panic!("{}/{} on {}: {}", case.feature, case.sub_feature, case.dialect, e))
}

#[test]
fn test_normalization_is_idempotent() {
    for case in all_cases() {
        for mode in [Mode::Actual, Mode::Validation] {
            assert_eq!(normalize(&case, mode), normalize(&case, mode));
        }
    }
}

#[test]
fn test_actual_state_is_superset_of_validation() {
    for case in all_cases() {
        let validation = normalize(&case, Mode::Validation);
        let actual = normalize(&case, Mode::Actual);
        assert_mode_superset(&validation, &actual);
    }
}

#[test]
fn test_acl_remarks_removed_and_survivors_renumbered() {
    let value = normalize(
        &case(ios::DIALECT, "system", "acl", ios::access_list_with_remarks()),
        Mode::Actual,
    );
    let acl = value
        .get("EDGE-IN")
        .and_then(StateValue::as_map)
        .expect("EDGE-IN present");
    let actions: Vec<(String, Option<&str>)> = acl
        .iter()
        .map(|(seq, entry)| {
            (
                seq.to_string(),
                entry.get("action").and_then(StateValue::as_str),
            )
        })
        .collect();
    assert_eq!(
        actions,
        vec![
            ("20".to_string(), Some("permit")),
            ("30".to_string(), Some("permit")),
            ("40".to_string(), Some("deny")),
        ]
    );
    // The entry formerly at 40 now sits at 30
    assert_eq!(
        acl.get(&StateKey::from(30)).and_then(|e| e.get("protocol")),
        Some(&StateValue::from("udp"))
    );

    let nx = normalize(
        &case(nxos::DIALECT, "system", "acl", nxos::access_list_with_remark()),
        Mode::Actual,
    );
    let vty = nx.get("VTY").and_then(StateValue::as_map).expect("VTY present");
    assert_eq!(vty.len(), 2);
}

#[test]
fn test_asa_interface_records() {
    let value = normalize(&case(asa::DIALECT, "interface", "intf", asa::interfaces()), Mode::Actual);
    assert_eq!(
        value,
        StateValue::Map(state_map! {
            "GigabitEthernet0/0" => state_map! {
                "description" => "ISP uplink",
                "duplex" => "Full-duplex",
                "speed" => "1000 Mbps",
                "type" => "i82546GB rev03",
                "status" => "up",
            },
            "Management0/0" => state_map! {
                "duplex" => "Auto-duplex",
                "speed" => "Auto-Speed",
                "type" => "i82546GB rev03",
                "status" => "down",
            },
        })
    );
    let validation = normalize(
        &case(asa::DIALECT, "interface", "intf", asa::interfaces()),
        Mode::Validation,
    );
    assert!(validation
        .get("GigabitEthernet0/0")
        .and_then(|v| v.get("status"))
        .is_none());
}

#[test]
fn test_route_next_hops_append_without_dedup() {
    let value = normalize(
        &case(ios::DIALECT, "route_table", "route", ios::route_records_repeating_hop()),
        Mode::Actual,
    );
    assert_eq!(
        value,
        StateValue::Map(state_map! {
            "global" => state_map! {
                "10.0.0.0/24" => state_map! {
                    "nh" => vec![
                        StateValue::from("192.0.2.1"),
                        StateValue::from("192.0.2.2"),
                        StateValue::from("192.0.2.1"),
                    ],
                    "rtype" => "B",
                }
            }
        })
    );
}

#[test]
fn test_subnetted_prefixes_repaired_in_text_routes() {
    let features = DeviceOutputs::new()
        .with("route_table", "route", ios::route_text())
        .with("route_table", "route_count", ios::route_text())
        .build();
    let tree = Normalizer::with_builtin(ios::DIALECT, Mode::Actual)
        .normalize(&features)
        .unwrap();
    assert_eq!(
        tree["route_table"]["route"],
        StateValue::Map(state_map! {
            "global" => state_map! {
                "0.0.0.0/0" => state_map! { "nh" => "10.0.0.1", "rtype" => "S*" },
                "10.0.0.0/24" => state_map! { "nh" => "GigabitEthernet0/0", "rtype" => "C" },
                "10.0.0.2/32" => state_map! { "nh" => "GigabitEthernet0/0", "rtype" => "L" },
                "172.16.1.0/24" => state_map! {
                    "nh" => vec![StateValue::from("10.0.0.5"), StateValue::from("10.0.0.6")],
                    "rtype" => "O IA",
                },
                "172.16.2.0/24" => state_map! { "nh" => "10.0.0.5", "rtype" => "O IA" },
            }
        })
    );
    assert_eq!(
        tree["route_table"]["route_count"],
        StateValue::Map(state_map! { "global" => 5 })
    );
}

#[test]
fn test_singleton_rows_match_sequence_rows() {
    let singleton = normalize(
        &case(nxos::DIALECT, "route_protocol", "bgp_peer", nxos::bgp_summary_singleton()),
        Mode::Actual,
    );
    let sequence = normalize(
        &case(nxos::DIALECT, "route_protocol", "bgp_peer", nxos::bgp_summary_sequence()),
        Mode::Actual,
    );
    assert_eq!(singleton, sequence);
    assert_eq!(
        singleton,
        StateValue::Map(state_map! {
            "10.0.0.1" => state_map! { "asn" => 65001, "rcv_pfx" => 12 }
        })
    );
}

#[test]
fn test_empty_output_is_empty_mapping_for_every_sub_feature() {
    let registry = FormatterRegistry::builtin();
    for dialect in [ios::DIALECT, nxos::DIALECT, asa::DIALECT, wlc::DIALECT, viptela::DIALECT] {
        let normalizer = Normalizer::with_builtin(dialect, Mode::Actual);
        for feature in registry.features() {
            let formatter = registry.get(feature).expect("registered formatter");
            for sub_feature in formatter.sub_features() {
                let output = empty_output("show");
                assert_eq!(
                    normalizer.normalize_sub_feature(feature, sub_feature, Some(&output)),
                    Ok(StateValue::empty_map())
                );
                assert_eq!(
                    normalizer.normalize_sub_feature(feature, sub_feature, None),
                    Ok(StateValue::empty_map())
                );
            }
        }
    }
}

#[test]
fn test_nxos_anywhere_in_identifier_selects_nxos() {
    for identifier in ["cisco_ios,nxos_ssh", "ssh_nxos_handler", "CISCO_NXOS"] {
        let normalizer = Normalizer::with_builtin(identifier, Mode::Actual);
        assert_eq!(normalizer.dialect(), Some(Dialect::Nxos));
        let value = normalizer
            .normalize_sub_feature("evpn", "nve_peer", Some(&nxos::nve_peers()))
            .unwrap();
        assert!(value.get("192.0.2.11").is_some());
    }
}

#[test]
fn test_document_end_to_end() {
    let content = r#"
dialect: [cisco_ios_telnet, cisco_ios]
features:
  system:
    image:
      command: show version
      output: [{VERSION: "17.3.4a"}]
  layer2:
    vlan:
      command: show vlan brief
      output: []
"#;
    let document = DeviceDocument::from_str_named(content, "rtr1.yaml").unwrap();
    assert_eq!(document.dialect.resolve(), Some(Dialect::Ios));
    let tree = Normalizer::with_builtin(document.dialect.identifier(), Mode::Validation)
        .normalize(&document.features)
        .unwrap();
    assert_eq!(
        tree["system"]["image"],
        StateValue::Map(state_map! { "image" => "17.3.4a" })
    );
    assert_eq!(tree["layer2"]["vlan"], StateValue::empty_map());
}

#[test]
fn test_document_with_absent_output_normalizes_to_empty() {
    let content = r#"
dialect: cisco_asa
features:
  vpn:
    ac_user:
      command: show vpn-sessiondb anyconnect
      output:
    sts_peer:
      command: show vpn-sessiondb l2l
"#;
    let document = DeviceDocument::from_str_named(content, "fw2.yaml").unwrap();
    let tree = Normalizer::with_builtin(document.dialect.identifier(), Mode::Actual)
        .normalize(&document.features)
        .unwrap();
    assert_eq!(tree["vpn"]["ac_user"], StateValue::empty_map());
    assert_eq!(tree["vpn"]["sts_peer"], StateValue::empty_map());
}

#[test]
fn test_skip_policy_keeps_good_sub_features() {
    let features = DeviceOutputs::new()
        .with("system", "image", ios::show_version())
        // evpn is NX-OS only
        .with("evpn", "nve_peer", nxos::nve_peers())
        .with("multicast", "pim", ios::show_version())
        .build();

    let halting = Normalizer::with_builtin(ios::DIALECT, Mode::Actual);
    assert!(halting.normalize(&features).is_err());

    let skipping =
        Normalizer::with_builtin(ios::DIALECT, Mode::Actual).with_error_policy(ErrorPolicy::Skip);
    let report = skipping.normalize_report(&features);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(
        report.tree.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["system"]
    );
    assert!(report
        .errors
        .iter()
        .any(|e| e.to_string().contains("multicast")));
}

#[test]
fn test_concurrent_normalization_matches_serial() {
    let cases = all_cases();
    let serial: Vec<StateValue> = cases.iter().map(|c| normalize(c, Mode::Actual)).collect();
    let parallel: Vec<StateValue> = std::thread::scope(|scope| {
        let handles: Vec<_> = cases
            .iter()
            .map(|c| scope.spawn(move || normalize(c, Mode::Actual)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("normalizer thread"))
            .collect()
    });
    assert_eq!(serial, parallel);
}
