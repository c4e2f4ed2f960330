use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ech_connect::ech::{hex_dump, EchConfigSource, NoEchConfig, StaticEchConfig};
use ech_connect::error::EchConnectError;

#[test]
fn test_hex_dump_basic() {
    assert_eq!(hex_dump(&[0x00, 0x1f, 0xff]), "00:1f:ff");
}

#[test]
fn test_hex_dump_single_byte() {
    assert_eq!(hex_dump(&[0xab]), "ab");
}

#[test]
fn test_hex_dump_empty() {
    assert_eq!(hex_dump(&[]), "");
}

#[test]
fn test_hex_dump_length_is_3n_minus_1() {
    for n in [1usize, 4, 32, 100] {
        let buf = vec![0x5au8; n];
        assert_eq!(hex_dump(&buf).len(), 3 * n - 1, "wrong length for n={}", n);
    }
}

#[test]
fn test_hex_dump_lowercase_octets() {
    let dump = hex_dump(&[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(dump, "de:ad:be:ef");
    assert!(!dump.chars().any(|c| c.is_ascii_uppercase()));
}

#[tokio::test]
async fn test_no_ech_config_source() {
    let source = NoEchConfig;
    assert!(source.ech_config_list("example.com").await.is_none());
}

#[tokio::test]
async fn test_static_source_round_trip() {
    let source = StaticEchConfig::new(vec![0x01, 0x02, 0x03]);
    let list = source.ech_config_list("example.com").await.unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(hex_dump(&list), "01:02:03");
}

#[tokio::test]
async fn test_static_source_same_for_every_host() {
    let source = StaticEchConfig::new(vec![0xfe, 0x0d]);
    let a = source.ech_config_list("a.example").await.unwrap();
    let b = source.ech_config_list("b.example").await.unwrap();
    assert_eq!(hex_dump(&a), hex_dump(&b));
}

#[test]
fn test_from_base64_valid() {
    let encoded = STANDARD.encode([0xfeu8, 0x0d, 0x00, 0x42]);
    let source = StaticEchConfig::from_base64(&encoded).unwrap();
    let list = tokio_test::block_on(source.ech_config_list("example.com")).unwrap();
    assert_eq!(hex_dump(&list), "fe:0d:00:42");
}

#[test]
fn test_from_base64_invalid() {
    let result = StaticEchConfig::from_base64("!!! not base64 !!!");
    assert!(matches!(result, Err(EchConnectError::InvalidInput(_))));
}

#[test]
fn test_from_base64_empty() {
    let result = StaticEchConfig::from_base64("");
    assert!(matches!(result, Err(EchConnectError::InvalidInput(_))));
}
