use super::*;
use crate::gap::parse_advertising_data;

#[test]
fn test_scheme_prefixes() {
    assert_eq!(encode_url("http://www.a").unwrap(), vec![0, b'a']);
    assert_eq!(encode_url("https://www.a").unwrap(), vec![1, b'a']);
    assert_eq!(encode_url("http://a").unwrap(), vec![2, b'a']);
    assert_eq!(encode_url("https://a").unwrap(), vec![3, b'a']);
}

#[test]
fn test_encode_url() {
    let mut expected = vec![0x01];
    expected.extend_from_slice(b"thebubbleworks");
    expected.push(0x00);
    assert_eq!(encode_url("https://www.thebubbleworks.com/").unwrap(), expected);

    // Unknown extensions are copied verbatim
    assert_eq!(
        encode_url("http://goo.gl/abc").unwrap(),
        vec![0x02, b'g', b'o', b'o', b'.', b'g', b'l', b'/', b'a', b'b', b'c']
    );
    assert_eq!(
        encode_url("https://example.org").unwrap(),
        vec![0x03, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0x08]
    );
    assert_eq!(
        encode_url("http://x.info/y").unwrap(),
        vec![0x02, b'x', 0x04, b'y']
    );
}

#[test]
fn test_invalid_scheme() {
    assert_eq!(encode_url("ftp://example.com"), Err(EddystoneError::InvalidScheme));
    assert_eq!(encode_url("example.com"), Err(EddystoneError::InvalidScheme));
}

#[test]
fn test_url_too_long() {
    let result = encode_url("https://www.averyveryverylongname.com/");
    assert_eq!(
        result,
        Err(EddystoneError::UrlTooLong { len: 23, max: MAX_ENCODED_URL_LEN })
    );

    // Exactly 18 bytes is accepted
    let url = format!("http://{}", "a".repeat(17));
    assert_eq!(encode_url(&url).unwrap().len(), MAX_ENCODED_URL_LEN);
}

#[test]
fn test_build_advertisement() {
    let url = "https://www.thebubbleworks.com/";
    let encoded = encode_url(url).unwrap();
    let payload = build_advertisement(url).unwrap();

    assert_eq!(payload.len(), ENVELOPE_LEN + encoded.len());
    assert!(payload.len() <= 31);
    assert_eq!(
        &payload[..ENVELOPE_LEN],
        &[
            0x02, 0x01, 0x1a, 0x03, 0x03, 0xaa, 0xfe,
            (5 + encoded.len()) as u8, 0x16, 0xaa, 0xfe, 0x10, 0xed,
        ]
    );
    assert_eq!(&payload[ENVELOPE_LEN..], &encoded[..]);

    let structures = parse_advertising_data(&payload);
    assert_eq!(structures.len(), 3);
    assert_eq!(structures[2].0, 0x16);
}

#[test]
fn test_build_advertisement_errors() {
    assert_eq!(
        build_advertisement("mailto:someone"),
        Err(EddystoneError::InvalidScheme)
    );
    assert!(matches!(
        build_advertisement("https://www.averyveryverylongname.com/"),
        Err(EddystoneError::UrlTooLong { .. })
    ));
}
