use super::*;
use pretty_assertions::assert_eq;

#[test]
fn normalized_forms() {
    assert_eq!(SemanticAddress::path("list/length").to_string(), "id:list/length");
    assert_eq!(SemanticAddress::code(*b"cobj").to_string(), "ae4:cobj");
    assert_eq!(SemanticAddress::code2(*b"coregetd").to_string(), "ae8:coregetd");
    assert_eq!(SemanticAddress::resource("Finder").to_string(), "res:Finder");
}

#[test]
fn parses_every_scheme_back() {
    for text in [
        "id:a/b/c",
        "ae4:pnam",
        "ae8:coresetd",
        "ae12:abcdefghijkl",
        "res:com.apple.finder",
    ] {
        let address: SemanticAddress = text.parse().unwrap();
        assert_eq!(address.to_string(), text);
    }
}

#[test]
fn rejects_malformed_addresses() {
    assert_eq!(
        "nothing".parse::<SemanticAddress>(),
        Err(AddressParseError::MissingScheme("nothing".into()))
    );
    assert_eq!(
        "zz:abc".parse::<SemanticAddress>(),
        Err(AddressParseError::UnknownScheme("zz".into()))
    );
    assert_eq!(
        "ae8:abc".parse::<SemanticAddress>(),
        Err(AddressParseError::BadCodes("abc".into()))
    );
}

#[test]
fn code_keeps_spaces_and_masks_control_bytes() {
    assert_eq!(Code::from_bytes(*b"obj ").to_string(), "obj ");
    assert_eq!(Code::from_bytes([0, b'a', b'b', b'c']).to_string(), "?abc");
}

#[test]
fn pathname_drops_empty_segments() {
    let path = Pathname::parse("/a//b/");
    assert_eq!(path.segments(), &["a".to_owned(), "b".to_owned()]);
    assert_eq!(path.appending("c").to_string(), "a/b/c");
}
