use super::*;
use crate::error::HciError;

#[test]
fn test_bdaddr_display_and_parse() {
    let addr = BdAddr::new([0xE4, 0xE9, 0x12, 0xEB, 0x27, 0xB8]);
    assert_eq!(addr.to_string(), "B8:27:EB:12:E9:E4");

    let parsed: BdAddr = "B8:27:EB:12:E9:E4".parse().unwrap();
    assert_eq!(parsed, addr);

    // Lowercase input is accepted, output is always uppercase
    let parsed: BdAddr = "b8:27:eb:12:e9:e4".parse().unwrap();
    assert_eq!(parsed.to_string(), "B8:27:EB:12:E9:E4");
}

#[test]
fn test_bdaddr_byte_order() {
    let human = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
    let addr = BdAddr::from_human(human);
    assert_eq!(addr.as_slice(), &[0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
    assert_eq!(addr.to_human(), human);
    assert_eq!(BdAddr::new(addr.to_human()).to_human(), addr.bytes);
}

#[test]
fn test_bdaddr_invalid() {
    for input in ["", "B8:27:EB:12:E9", "B8:27:EB:12:E9:E4:00", "B8:27:EB:12:E9:ZZ", "B8:27:EB:12:E9:E"] {
        let result = input.parse::<BdAddr>();
        assert!(matches!(result, Err(HciError::InvalidAddress(_))), "{}", input);
    }
}

#[test]
fn test_bdaddr_from_slice() {
    assert_eq!(
        BdAddr::from_slice(&[1, 2, 3, 4, 5, 6, 7]),
        Some(BdAddr::new([1, 2, 3, 4, 5, 6]))
    );
    assert_eq!(BdAddr::from_slice(&[1, 2, 3]), None);
}

#[test]
fn test_advertising_type_names() {
    assert_eq!(AdvertisingType::try_from(ADV_IND).unwrap().to_string(), "ADV_IND");
    assert_eq!(AdvertisingType::try_from(SCAN_RSP).unwrap().name(), "SCAN_RSP");
    assert!(AdvertisingType::try_from(0x05).is_err());
}

#[test]
fn test_address_type_conversion() {
    assert_eq!(AddressType::try_from(0x01).unwrap(), AddressType::Random);
    assert_eq!(u8::from(AddressType::Public), PUBLIC_DEVICE_ADDRESS);
    assert!(AddressType::try_from(0x02).is_err());
}

#[test]
fn test_advertising_data_builder() {
    let payload = AdvertisingDataBuilder::new()
        .flags(FLAG_LE_GENERAL_DISCOVERABLE | FLAG_BR_EDR_NOT_SUPPORTED)
        .complete_16bit_uuids(&[0x180D])
        .complete_local_name("hr")
        .build()
        .unwrap();

    assert_eq!(
        payload,
        vec![0x02, 0x01, 0x06, 0x03, 0x03, 0x0D, 0x18, 0x03, 0x09, b'h', b'r']
    );
    assert_eq!(
        parse_advertising_data(&payload),
        vec![
            (ADV_TYPE_FLAGS, vec![0x06]),
            (ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE, vec![0x0D, 0x18]),
            (ADV_TYPE_COMPLETE_LOCAL_NAME, b"hr".to_vec()),
        ]
    );
}

#[test]
fn test_advertising_data_builder_limit() {
    let builder = AdvertisingDataBuilder::new().complete_local_name(&"x".repeat(29));
    assert_eq!(builder.len(), 31);
    assert!(builder.build().is_ok());

    let builder = builder.flags(0x06);
    assert!(matches!(
        builder.build(),
        Err(HciError::PayloadTooLong { len: 34, max: 31 })
    ));
}

#[test]
fn test_parse_advertising_data_stops_on_bad_length() {
    // Second structure claims more bytes than remain
    let data = [0x02, 0x01, 0x06, 0x09, 0x09, b'a'];
    assert_eq!(parse_advertising_data(&data), vec![(0x01, vec![0x06])]);

    // Zero length terminates the significant part
    let data = [0x02, 0x01, 0x06, 0x00, 0x00, 0x00];
    assert_eq!(parse_advertising_data(&data).len(), 1);

    assert!(parse_advertising_data(&[]).is_empty());
}

#[test]
fn test_service_data_structure() {
    let builder = AdvertisingDataBuilder::new().service_data_16bit(0xFEAA, &[0x10, 0xED]);
    assert!(!builder.is_empty());
    assert_eq!(builder.build().unwrap(), vec![0x05, 0x16, 0xAA, 0xFE, 0x10, 0xED]);
}
