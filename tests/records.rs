use std::collections::BTreeMap;

use codex::{CodecError, Record, Registry};

#[derive(Record, Debug, Clone, PartialEq)]
#[record(rename_all = "PascalCase")]
struct User {
    id: i64,
    name: String,
}

#[derive(Record, Debug, PartialEq)]
#[record(rename_all = "camelCase")]
struct Team {
    team_name: String,
    members: Vec<User>,
    #[record(rename = "lead")]
    leader: Option<KeyUser>,
    #[record(default)]
    tags: Vec<String>,
    scores: BTreeMap<String, u32>,
}

type KeyUser = codex::KeyValue<String, u8>;

#[derive(Record, Debug, PartialEq, Default)]
struct Empty {}

#[test]
fn record_example() {
    let registry = Registry::new();
    let user = User {
        id: 42,
        name: "ann".to_string(),
    };

    let bytes = registry.to_vec(&user).expect("encode");
    assert_eq!(bytes, br#"{"Id":42,"Name":"ann"}"#);
    assert_eq!(registry.from_slice::<User>(&bytes).expect("decode"), user);

    let extended = br#"{"Id":42,"Name":"ann","Extra":true}"#;
    assert_eq!(registry.from_slice::<User>(extended).expect("decode"), user);
}

#[test]
fn unknown_members_of_any_shape_are_skipped() {
    let registry = Registry::new();
    let bytes = br#"{"Nested":{"a":[1,{"b":null}]},"Name":"ann","List":[],"Id":42}"#;
    let user: User = registry.from_slice(bytes).expect("decode");
    assert_eq!(user.id, 42);
    assert_eq!(user.name, "ann");
}

#[test]
fn null_record_is_an_error() {
    let registry = Registry::new();
    assert!(matches!(
        registry.from_slice::<User>(b"null"),
        Err(CodecError::UnexpectedNull { .. })
    ));
}

#[test]
fn missing_member_is_an_error() {
    let registry = Registry::new();
    assert!(matches!(
        registry.from_slice::<User>(br#"{"Id":1}"#),
        Err(CodecError::MissingField { field: "Name", .. })
    ));
}

#[test]
fn malformed_record_is_an_error() {
    let registry = Registry::new();
    assert!(registry.from_slice::<User>(br#"{"Id":1,"Name":"a""#).is_err());
    assert!(registry.from_slice::<User>(br#"["Id",1]"#).is_err());
    assert!(registry.from_slice::<User>(br#"{"Id":"1","Name":"a"}"#).is_err());
}

#[test]
fn nested_records_and_attributes() {
    let registry = Registry::new();
    let team = Team {
        team_name: "core".to_string(),
        members: vec![
            User {
                id: 1,
                name: "ann".to_string(),
            },
            User {
                id: 2,
                name: "bo".to_string(),
            },
        ],
        leader: Some(codex::KeyValue::new("ann".to_string(), 1)),
        tags: vec!["x".to_string()],
        scores: BTreeMap::from([("ann".to_string(), 3)]),
    };

    let bytes = registry.to_vec(&team).expect("encode");
    let text = String::from_utf8(bytes.clone()).expect("utf8");
    assert!(text.starts_with(r#"{"teamName":"core","members":[{"Id":1,"#));
    assert!(text.contains(r#""lead":{"Key":"ann","Value":1}"#));
    assert_eq!(registry.from_slice::<Team>(&bytes).expect("decode"), team);

    let without_tags = br#"{"teamName":"t","members":[],"lead":null,"scores":{}}"#;
    let decoded: Team = registry.from_slice(without_tags).expect("decode");
    assert!(decoded.tags.is_empty());
    assert!(decoded.leader.is_none());
}

#[test]
fn empty_record() {
    let registry = Registry::new();
    assert_eq!(registry.to_vec(&Empty {}).expect("encode"), b"{}");
    assert_eq!(
        registry.from_slice::<Empty>(br#"{"ignored":1}"#).expect("decode"),
        Empty {}
    );
}
