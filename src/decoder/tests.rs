use super::*;

/// Prefix `tokens` with their count and encode as little-endian f32
fn message(tokens: &[f32]) -> Vec<u8> {
    std::iter::once(tokens.len() as f32)
        .chain(tokens.iter().copied())
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

/// Name length followed by character codes
fn name(s: &str) -> Vec<f32> {
    std::iter::once(s.chars().count() as f32)
        .chain(s.chars().map(|c| c as u32 as f32))
        .collect()
}

fn tokens(parts: &[&[f32]]) -> Vec<f32> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

#[test]
fn test_single_nested_value() {
    // identifier 0, struct "A" holding data field "x" = [3.0]
    let stream = tokens(&[&[0.0], &name("A"), &[1.0], &name("x"), &[3.0]]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    assert_eq!(table.child_struct_names(), vec!["A"]);
    assert!(table.child_data_names().is_empty());
    assert_eq!(table.child_struct("A").child_data("x"), vec![3.0]);
}

#[test]
fn test_struct_with_two_fields() {
    let stream = tokens(&[
        &[0.0],
        &name("body"),
        &[1.0],
        &name("V_Kb"),
        &[15.5, -3.25, 3.75],
        &[1.0],
        &name("q_bg"),
        &[-0.7, 3.5, -1.5, 8.0],
    ]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    let body = table.child_struct("body");
    assert_eq!(body.child_data_names(), vec!["V_Kb", "q_bg"]);
    assert_eq!(body.child_data("V_Kb"), vec![15.5, -3.25, 3.75]);
    assert_eq!(
        body.child_data("q_bg"),
        vec![f64::from(-0.7f32), 3.5, -1.5, 8.0]
    );
}

#[test]
fn test_pop_multiple_levels() {
    // a{ b{ c:[7] } } d:[8]
    let stream = tokens(&[
        &[0.0],
        &name("a"),
        &[1.0],
        &name("b"),
        &[2.0],
        &name("c"),
        &[7.0],
        &[0.0],
        &name("d"),
        &[8.0],
    ]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    assert_eq!(table.child_names(), vec!["a", "d"]);
    assert_eq!(table.child_data("d"), vec![8.0]);
    assert_eq!(table.data_at_path(&["a", "b", "c"]), vec![7.0]);

    let nodes = table.nodes();
    assert_eq!(nodes.len(), 4);
    assert_eq!(
        nodes.iter().map(|n| n.level).collect::<Vec<_>>(),
        vec![1, 2, 3, 1]
    );
    assert_eq!(nodes[0].child_refs, vec![1]);
    assert_eq!(nodes[1].child_refs, vec![2]);
    assert!(nodes[0].is_struct && nodes[1].is_struct);
    assert!(!nodes[2].is_struct && !nodes[3].is_struct);
}

#[test]
fn test_pop_one_level_then_sibling_struct() {
    // s{ x:[4.5] } t{ y:[2.5], z:[] }
    let stream = tokens(&[
        &[0.0],
        &name("s"),
        &[1.0],
        &name("x"),
        &[4.5],
        &[0.0],
        &name("t"),
        &[1.0],
        &name("y"),
        &[2.5],
        &[1.0],
        &name("z"),
    ]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    assert_eq!(table.child_struct_names(), vec!["s", "t"]);
    let t = table.child_struct("t");
    assert_eq!(t.child_data_names(), vec!["y", "z"]);
    assert!(t.child_data("z").is_empty());
    assert_eq!(table.nodes()[2].child_refs, vec![3, 4]);
}

#[test]
fn test_child_ref_counts_match_input() {
    let stream = tokens(&[
        &[0.0],
        &name("wing"),
        &[1.0],
        &name("x"),
        &[10.0, 20.0, 30.0],
        &[1.0],
        &name("y"),
        &[-1.0, -2.0],
        &[0.0],
        &name("t"),
        &[99.0],
    ]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    let counts: Vec<(String, usize)> = table
        .nodes()
        .iter()
        .map(|n| (n.name.clone(), n.child_refs.len()))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("wing".to_string(), 2),
            ("x".to_string(), 3),
            ("y".to_string(), 2),
            ("t".to_string(), 1),
        ]
    );
    assert_eq!(table.data(), &[10.0, 20.0, 30.0, -1.0, -2.0, 99.0]);
}

#[test]
fn test_nonzero_identifier_base() {
    // With base 100, small integers are ordinary data
    let stream = tokens(&[
        &[100.0],
        &name("cfg"),
        &[101.0],
        &name("n"),
        &[0.0, 1.0, 2.0, 3.0],
    ]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    assert_eq!(table.child_struct("cfg").child_data("n"), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(table.nodes()[1].level, 2);
}

#[test]
fn test_value_in_marker_range_ends_data_run() {
    // Base 0: the 0.0 inside "v" reads as a same-level marker, so the
    // following 1.0 becomes a name length
    let stream = tokens(&[&[0.0], &name("v"), &[5.0, 0.0], &name("w"), &[6.0]]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    assert_eq!(table.child_data_names(), vec!["v", "w"]);
    assert_eq!(table.child_data("v"), vec![5.0]);
}

#[test]
fn test_data_followed_by_deeper_marker_is_malformed() {
    let stream = tokens(&[&[0.0], &name("v"), &[5.0, 1.0], &name("w"), &[6.0]]);
    let err = Decoder::new().decode(&message(&stream)).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedStream { position: 4, .. }));
}

#[test]
fn test_payload_precision_is_kept() {
    let stream = tokens(&[&[10.0], &name("p"), &[0.1, 2.4999]]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();
    assert_eq!(
        table.child_data("p"),
        vec![f64::from(0.1f32), f64::from(2.4999f32)]
    );
}

#[test]
fn test_empty_field_name() {
    let stream = tokens(&[&[0.0], &[0.0], &[4.0]]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();
    assert_eq!(table.child_names(), vec![""]);
    assert_eq!(table.child_data(""), vec![4.0]);
}

#[test]
fn test_zero_count_is_empty() {
    let table = Decoder::new().decode(&message(&[])).unwrap();
    assert!(table.is_empty());
    assert!(table.data().is_empty());
}

#[test]
fn test_truncated_is_rejected() {
    let mut bytes = message(&tokens(&[&[0.0], &name("a"), &[1.0, 2.0]]));
    bytes.truncate(bytes.len() - 4);
    assert!(matches!(
        Decoder::new().decode(&bytes),
        Err(DecodeError::TruncatedStream {
            declared: 5,
            available: 4
        })
    ));
}

#[test]
fn test_name_longer_than_stream() {
    let stream = [0.0, 10.0, 97.0, 98.0];
    let err = Decoder::new().decode(&message(&stream)).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedStream { position: 1, .. }));
}

#[test]
fn test_stream_ends_inside_header() {
    // Only the identifier
    assert!(Decoder::new().decode(&message(&[0.0])).is_err());

    // Sibling marker with nothing after it
    let stream = tokens(&[&[0.0], &name("a"), &[5.0], &[0.0]]);
    let err = Decoder::new().decode(&message(&stream)).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedStream { .. }));
}

#[test]
fn test_invalid_character_code() {
    let stream = [0.0, 1.0, -65.0, 1.0];
    assert!(matches!(
        Decoder::new().decode(&message(&stream)),
        Err(DecodeError::MalformedStream { position: 2, .. })
    ));

    let stream = [0.0, 1.0, 55296.0, 1.0]; // lone surrogate
    assert!(Decoder::new().decode(&message(&stream)).is_err());
}

#[test]
fn test_non_finite_identifier() {
    let stream = [f32::INFINITY, 1.0, 97.0];
    assert!(matches!(
        Decoder::new().decode(&message(&stream)),
        Err(DecodeError::MalformedStream { position: 0, .. })
    ));
}

#[test]
fn test_identifier_out_of_range() {
    for identifier in [1.0e19, -1.0e19, f32::MAX, f32::MIN, 4.0e9] {
        let stream = [identifier, 1.0, 97.0, identifier];
        match Decoder::new().decode(&message(&stream)) {
            Err(DecodeError::MalformedStream { position, .. }) => assert_eq!(position, 0),
            other => panic!("identifier {}: expected malformed, got {:?}", identifier, other),
        }
    }
}

#[test]
fn test_identifier_near_i32_limit() {
    // largest f32 below 2^31
    let base = 2_147_483_520.0f32;
    let stream = tokens(&[&[base], &name("t"), &[1.0e19, f32::MAX, 7.5]]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    assert_eq!(table.child_data_names(), vec!["t"]);
    assert_eq!(table.child_data("t"), vec![1.0e19f32 as f64, f32::MAX as f64, 7.5]);
}

#[test]
fn test_huge_tokens_after_normal_base_are_data() {
    let stream = tokens(&[
        &[0.0],
        &name("a"),
        &[1.0e19, -1.0e19, f32::MAX, f32::MIN],
        &[0.0],
        &name("b"),
        &[2.5],
    ]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();

    assert_eq!(table.child_data_names(), vec!["a", "b"]);
    assert_eq!(table.child_data("a").len(), 4);
    assert_eq!(table.child_data("b"), vec![2.5]);
}

#[test]
fn test_non_finite_values_are_data() {
    let stream = tokens(&[&[0.0], &name("n"), &[f32::NAN, f32::INFINITY]]);
    let table = Decoder::new().decode(&message(&stream)).unwrap();
    let values = table.child_data("n");
    assert_eq!(values.len(), 2);
    assert!(values[0].is_nan());
    assert!(values[1].is_infinite());
}

#[test]
fn test_decoder_is_reusable() {
    let decoder = Decoder::with_frame(7);
    assert_eq!(decoder.frame(), 7);

    let first = tokens(&[&[0.0], &name("a"), &[2.0]]);
    let second = tokens(&[&[0.0], &name("b"), &[3.0]]);
    let a = decoder.decode(&message(&first)).unwrap();
    let b = decoder.decode(&message(&second)).unwrap();

    assert_eq!(a.child_names(), vec!["a"]);
    assert_eq!(b.child_names(), vec!["b"]);
    assert_eq!(b.data(), &[3.0]);
}
