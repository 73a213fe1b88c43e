use automn_dsl::{parse, print, to_sexp};

/// Parse, print, parse again and compare the two trees.
///
/// Spans differ after reprinting, so the trees are compared through their
/// S-expression dumps, which leave positions out. The printed text must
/// also be a fixed point of printing.
fn assert_round_trip(source: &str) {
    let first = parse(source).expect("first parse should succeed");
    let printed = print(&first);
    let second = parse(&printed).unwrap_or_else(|error| {
        panic!("second parse (after printing) failed: {error}\n\nPrinted DSL:\n{printed}");
    });

    assert_eq!(
        first.definitions.len(),
        second.definitions.len(),
        "definition count mismatch after round trip"
    );
    for (d1, d2) in first.definitions.iter().zip(second.definitions.iter()) {
        assert_eq!(d1.name(), d2.name(), "definition name mismatch");
        assert_eq!(d1.kind(), d2.kind(), "definition kind mismatch for '{}'", d1.name());
    }
    assert_eq!(to_sexp(&first), to_sexp(&second), "tree mismatch:\n{printed}");
    assert_eq!(print(&second), printed, "printing is not stable");
}

#[test]
fn round_trip_minimal_model() {
    assert_round_trip("User\n  name: String\n");
}

#[test]
fn round_trip_bare_definitions() {
    assert_round_trip("Empty\n\nping()\n\n|Nothing\n");
}

#[test]
fn round_trip_modifiers_and_mixins() {
    assert_round_trip("Account \"accounts\" 3 true null -1.5e3 &Timestamps &SoftDelete\n  id: Uuid\n");
}

#[test]
fn round_trip_types() {
    assert_round_trip(
        "Shapes
  a: Int
  b?: Decimal(10, 2)
  c: [String]
  d: [[Int]]
  e: Circle, Square, Triangle
  f: Red, Green | Blue
  g: Int | Float | Null
  h: [Small, Large] | Null
  i: Map(String, 16)
",
    );
}

#[test]
fn round_trip_field_tails_and_bodies() {
    assert_round_trip(
        r#"Profile
  handle: String ~ "ada" = "anonymous"
  age: Int
    > Age in whole years
    [pii]
    min :: 0
    ~ 36
    = 18
    : postgres : SmallInt
  bio
    : String
    > Free text
  nickname
    ?: String
  <lang: Locale>: String
  <key>
"#,
    );
}

#[test]
fn round_trip_describers() {
    assert_round_trip(
        r#"Document
  > Short summary
  >
  >>
    First line.
      Indented detail.
    Last line.
  [versioned, audited]
  owner :: "platform"
  retention :: {days: 30, "hard delete": false, tiers: [1, 2.5, null]}
  route :: !/documents/<id: Uuid ~ "d0c">/revisions?limit=10
  empty :: {}
  none :: []
"#,
    );
}

#[test]
fn round_trip_string_escapes() {
    assert_round_trip(
        "Escapes\n  a: String = \"tab\\there\"\n  b: String = \"quote \\\" and backslash \\\\\"\n  c: String = \"\\u{1F600} \\x41 \\101\"\n",
    );
}

#[test]
fn round_trip_associated_and_methods() {
    assert_round_trip(
        "Invoice
  number: String
  /Line \"invoice_lines\"
    sku: String
    quantity: Int = 1
    subtotal()
      -> amount: Decimal(12, 2)
  total()
    > Sum of all lines.
    currency?: Currency
    -> amount: Decimal(12, 2) ~ 0
      > Rounded to cents
",
    );
}

#[test]
fn round_trip_functions() {
    assert_round_trip(
        "search()
  > Full text search.
  query: String
  limit?: Int = 20
  -> hits: [Hit]
  -> total: Int

health()
  -> ok: Bool = true
",
    );
}

#[test]
fn round_trip_enums() {
    assert_round_trip(
        r#"|Level: Int
  > Log severity.
  Debug = 10
  Info = 20
    > Default level
  Warn
    = 30
  Error = 40

|Event
  Created(Uuid)
  Moved(Point, Point)
    [geo]
  Tagged([String] | Null)
"#,
    );
}

#[test]
fn round_trip_nested_values() {
    assert_round_trip(
        r#"Settings
  layout :: [{name: "grid", cols: 12}, {name: "stack", gap: [4, 8]}]
  flags: Json = {beta: {enabled: true, cohort: [1, 2, 3]}, "legacy-mode": null}
"#,
    );
}

#[test]
fn round_trip_reindents_tabs_and_crlf() {
    let source = "User\r\n\tname: String\r\n\taddress\r\n\t\t> Postal address\r\n";
    assert_round_trip(source);
    let printed = print(&parse(source).unwrap());
    assert_eq!(printed, "User\n  name: String\n  address\n    > Postal address\n");
}
