use super::*;
use crate::{
    Delimiter, DelimiterKind, Ident, IdentIsRaw, Leaf, LitKind, Spacing, TokenId, TokenTree,
};
use pretty_assertions::assert_eq;

const M: u32 = u32::MAX;

/// `foo!(1)` with consecutive ids.
fn foo_bang_call() -> Subtree {
    Subtree::root(vec![
        Leaf::ident("foo", TokenId(0)).into(),
        Leaf::punct('!', Spacing::Alone, TokenId(1)).into(),
        Subtree::delimited(
            Delimiter::new(TokenId(2), DelimiterKind::Parenthesis),
            vec![Leaf::literal("1", LitKind::Integer, TokenId(3)).into()],
        )
        .into(),
    ])
}

fn decode_err(flat: &FlatTree, version: ExpanderVersion) -> FlatTreeError {
    match flat.to_subtree(version) {
        Ok(tree) => panic!("expected decode error, got {}", tree.to_debug_string()),
        Err(err) => err,
    }
}

#[test]
fn test_encode_legacy_layout() {
    let flat = FlatTree::from_subtree(&foo_bang_call(), ExpanderVersion::VersionCheck);
    assert_eq!(
        flat,
        FlatTree {
            subtree: vec![M, 0, 0, 3, 2, 1, 3, 4],
            literal: vec![3, 1],
            punct: vec![1, u32::from('!'), 0],
            ident: vec![0, 0],
            token_tree: vec![0b11, 0b10, (1 << 2), 0b01],
            text: vec!["foo".to_owned(), "1".to_owned()],
        }
    );
}

#[test]
fn test_encode_close_span_layout() {
    let flat = FlatTree::from_subtree(&foo_bang_call(), ExpanderVersion::EncodeCloseSpan);
    assert_eq!(flat.subtree, vec![M, M, 0, 0, 3, 2, M, 1, 3, 4]);
}

#[test]
fn test_encode_extended_leaf_layout() {
    let tree = Subtree::root(vec![
        Leaf::Ident(Ident {
            text: "type".to_owned(),
            is_raw: IdentIsRaw::Yes,
            id: TokenId(0),
        })
        .into(),
        Leaf::literal("\"hi\"", LitKind::Str, TokenId(1)).into(),
    ]);
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::ExtendedLeafData);
    assert_eq!(flat.ident, vec![0, 0, 1]);
    assert_eq!(flat.literal, vec![1, 1, LitKind::Str.to_wire(), M]);
    assert_eq!(flat.text, vec!["type".to_owned(), "hi".to_owned()]);

    let Ok(decoded) = flat.to_subtree(ExpanderVersion::ExtendedLeafData) else {
        panic!("extended layout should decode");
    };
    assert_eq!(decoded, tree);
}

#[test]
fn test_legacy_raw_ident_carries_prefix() {
    let tree = Subtree::root(vec![Leaf::Ident(Ident {
        text: "match".to_owned(),
        is_raw: IdentIsRaw::Yes,
        id: TokenId(0),
    })
    .into()]);
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::HasGlobalSpans);
    assert_eq!(flat.text, vec!["r#match".to_owned()]);
    assert_eq!(flat.to_subtree(ExpanderVersion::HasGlobalSpans), Ok(tree));
}

#[test]
fn test_strings_are_interned_once() {
    let tree = Subtree::root(vec![
        Leaf::ident("x", TokenId(0)).into(),
        Leaf::ident("x", TokenId(1)).into(),
        Subtree::delimited(
            Delimiter::new(TokenId(2), DelimiterKind::Bracket),
            vec![Leaf::ident("x", TokenId(3)).into()],
        )
        .into(),
    ]);
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::LATEST);
    assert_eq!(flat.text, vec!["x".to_owned()]);
    assert_eq!(flat.ident, vec![0, 0, 0, 1, 0, 0, 3, 0, 0]);
}

#[test]
fn test_breadth_first_numbering() {
    // { ( ) [ ] } : root -> brace(1) -> paren(2), bracket(3)
    let tree = Subtree::root(vec![Subtree::delimited(
        Delimiter::new(TokenId(0), DelimiterKind::Brace),
        vec![
            Subtree::delimited(Delimiter::new(TokenId(1), DelimiterKind::Parenthesis), vec![])
                .into(),
            Subtree::delimited(Delimiter::new(TokenId(3), DelimiterKind::Bracket), vec![])
                .into(),
        ],
    )
    .into()]);
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::VersionCheck);
    assert_eq!(
        flat.subtree,
        vec![M, 0, 0, 1, 0, 2, 1, 3, 1, 1, 3, 3, 3, 3, 3, 3]
    );
    assert_eq!(flat.token_tree, vec![1 << 2, 2 << 2, 3 << 2]);
    assert_eq!(flat.to_subtree(ExpanderVersion::VersionCheck), Ok(tree));
}

#[test]
fn test_decode_literal_suffix() {
    let flat = FlatTree {
        subtree: vec![M, M, 0, 0, 1],
        literal: vec![0, 0, LitKind::Integer.to_wire(), 1],
        token_tree: vec![0b01],
        text: vec!["1".to_owned(), "u8".to_owned()],
        ..FlatTree::default()
    };
    let Ok(tree) = flat.to_subtree(ExpanderVersion::LATEST) else {
        panic!("literal with suffix should decode");
    };
    assert_eq!(
        tree,
        Subtree::root(vec![Leaf::literal("1u8", LitKind::Integer, TokenId(0)).into()])
    );
}

#[test]
fn test_decode_legacy_infers_literal_kind() {
    let flat = FlatTree {
        subtree: vec![M, 0, 0, 2],
        literal: vec![M, 0, M, 1],
        token_tree: vec![0b01, (1 << 2) | 0b01],
        text: vec!["'a'".to_owned(), "2.5".to_owned()],
        ..FlatTree::default()
    };
    assert_eq!(
        flat.to_subtree(ExpanderVersion::VersionCheck),
        Ok(Subtree::root(vec![
            Leaf::literal("'a'", LitKind::Char, TokenId::UNMAPPED).into(),
            Leaf::literal("2.5", LitKind::Float, TokenId::UNMAPPED).into(),
        ]))
    );
}

#[test]
fn test_decode_missing_root() {
    assert_eq!(
        decode_err(&FlatTree::default(), ExpanderVersion::LATEST),
        FlatTreeError::MissingRoot
    );
}

#[test]
fn test_decode_misaligned_subtree_records() {
    let flat = FlatTree {
        subtree: vec![M, 0, 0],
        ..FlatTree::default()
    };
    assert_eq!(
        decode_err(&flat, ExpanderVersion::VersionCheck),
        FlatTreeError::MisalignedRecords {
            array: "subtree",
            len: 3,
            stride: 4
        }
    );
}

#[test]
fn test_decode_unknown_delimiter_kind() {
    let flat = FlatTree {
        subtree: vec![M, 7, 0, 0],
        ..FlatTree::default()
    };
    assert_eq!(
        decode_err(&flat, ExpanderVersion::VersionCheck),
        FlatTreeError::UnknownDelimiterKind(7)
    );
}

#[test]
fn test_decode_unknown_spacing_and_char() {
    let spacing = FlatTree {
        subtree: vec![M, 0, 0, 1],
        punct: vec![0, u32::from('+'), 2],
        token_tree: vec![0b10],
        ..FlatTree::default()
    };
    assert_eq!(
        decode_err(&spacing, ExpanderVersion::VersionCheck),
        FlatTreeError::UnknownSpacing(2)
    );

    let surrogate = FlatTree {
        punct: vec![0, 0xD800, 0],
        ..spacing
    };
    assert_eq!(
        decode_err(&surrogate, ExpanderVersion::VersionCheck),
        FlatTreeError::InvalidChar(0xD800)
    );
}

#[test]
fn test_decode_unknown_lit_kind() {
    let flat = FlatTree {
        subtree: vec![M, M, 0, 0, 1],
        literal: vec![0, 0, 99, M],
        token_tree: vec![0b01],
        text: vec!["1".to_owned()],
        ..FlatTree::default()
    };
    assert_eq!(
        decode_err(&flat, ExpanderVersion::LATEST),
        FlatTreeError::UnknownLitKind(99)
    );
}

#[test]
fn test_decode_out_of_range_indices() {
    let missing_ident = FlatTree {
        subtree: vec![M, 0, 0, 1],
        token_tree: vec![(5 << 2) | 0b11],
        ..FlatTree::default()
    };
    assert_eq!(
        decode_err(&missing_ident, ExpanderVersion::VersionCheck),
        FlatTreeError::IndexOutOfRange {
            array: "ident",
            index: 5,
            len: 0
        }
    );

    let missing_text = FlatTree {
        ident: vec![0, 3],
        token_tree: vec![0b11],
        ..missing_ident.clone()
    };
    assert_eq!(
        decode_err(&missing_text, ExpanderVersion::VersionCheck),
        FlatTreeError::IndexOutOfRange {
            array: "text",
            index: 3,
            len: 0
        }
    );

    let bad_slice = FlatTree {
        subtree: vec![M, 0, 0, 9],
        ..missing_ident
    };
    assert!(matches!(
        decode_err(&bad_slice, ExpanderVersion::VersionCheck),
        FlatTreeError::IndexOutOfRange {
            array: "token_tree",
            ..
        }
    ));
}

#[test]
fn test_decode_rejects_back_reference() {
    let flat = FlatTree {
        subtree: vec![M, 0, 0, 1],
        token_tree: vec![TAG_SUBTREE],
        ..FlatTree::default()
    };
    assert_eq!(
        decode_err(&flat, ExpanderVersion::VersionCheck),
        FlatTreeError::BackReference {
            parent: 0,
            child: 0
        }
    );
}

#[test]
fn test_decode_rejects_reused_subtree() {
    let flat = FlatTree {
        subtree: vec![M, 0, 0, 2, 4, 1, 2, 2],
        token_tree: vec![1 << 2, 1 << 2],
        ..FlatTree::default()
    };
    assert_eq!(
        decode_err(&flat, ExpanderVersion::VersionCheck),
        FlatTreeError::SubtreeReused(1)
    );
}

#[test]
fn test_nested_decode_without_placeholders() {
    let mut tree = Subtree::root(vec![Leaf::ident("core", TokenId(0)).into()]);
    for depth in 1..=500 {
        tree = Subtree::root(vec![Subtree::delimited(
            Delimiter::new(TokenId(depth), DelimiterKind::Parenthesis),
            std::mem::take(&mut tree.token_trees),
        )
        .into()]);
    }
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::LATEST);
    assert_eq!(flat.subtree.len() / 5, 501);
    assert_eq!(flat.to_subtree(ExpanderVersion::LATEST), Ok(tree));
}

fn literals(texts: &[&str]) -> Subtree {
    let token_trees = texts
        .iter()
        .zip(0..)
        .map(|(&text, id)| Leaf::literal(text, LitKind::infer(text), TokenId(id)).into())
        .collect();
    Subtree::root(token_trees)
}

#[test]
fn test_extended_literals_strip_quotes_of_every_kind() {
    let tree = literals(&["'a'", "b'x'", "b\"x\"", "\"s\"", "c\"z\""]);
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::ExtendedLeafData);
    assert_eq!(
        flat.literal,
        vec![
            0, 0, LitKind::Char.to_wire(), M,
            1, 1, LitKind::Byte.to_wire(), M,
            2, 1, LitKind::ByteStr.to_wire(), M,
            3, 2, LitKind::Str.to_wire(), M,
            4, 3, LitKind::CStr.to_wire(), M,
        ]
    );
    assert_eq!(flat.text, vec!["a", "x", "s", "z"]);
    assert_eq!(flat.to_subtree(ExpanderVersion::ExtendedLeafData), Ok(tree));
}

#[test]
fn test_extended_literal_suffix_uses_the_suffix_slot() {
    let tree = literals(&["\"a\"suf", "'c'x", "7u8"]);
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::ExtendedLeafData);
    assert_eq!(
        flat.literal,
        vec![
            0, 0, LitKind::Str.to_wire(), 1,
            1, 2, LitKind::Char.to_wire(), 3,
            2, 4, LitKind::Integer.to_wire(), M,
        ]
    );
    assert_eq!(flat.text, vec!["a", "suf", "c", "x", "7u8"]);
    assert_eq!(flat.to_subtree(ExpanderVersion::ExtendedLeafData), Ok(tree));
}

#[test]
fn test_extended_literal_escapes_travel_as_written() {
    let tree = literals(&[r#""a\"b\n""#]);
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::ExtendedLeafData);
    assert_eq!(flat.text, vec![r#"a\"b\n"#]);
    assert_eq!(flat.to_subtree(ExpanderVersion::ExtendedLeafData), Ok(tree));
}

#[test]
fn test_extended_raw_strings_travel_verbatim() {
    let tree = literals(&["r#\"x\"#", "br\"y\"", "-1"]);
    let flat = FlatTree::from_subtree(&tree, ExpanderVersion::ExtendedLeafData);
    let err = LitKind::Err.to_wire();
    assert_eq!(flat.literal, vec![0, 0, err, M, 1, 1, err, M, 2, 2, err, M]);
    assert_eq!(flat.text, vec!["r#\"x\"#", "br\"y\"", "-1"]);
    assert_eq!(flat.to_subtree(ExpanderVersion::ExtendedLeafData), Ok(tree));
}

#[test]
fn test_decode_raw_string_symbol_gets_enough_hashes() {
    let flat = FlatTree {
        subtree: vec![M, M, 0, 0, 2],
        literal: vec![
            0, 0, LitKind::StrRaw.to_wire(), M,
            1, 1, LitKind::ByteStrRaw.to_wire(), M,
        ],
        token_tree: vec![0b01, (1 << 2) | 0b01],
        text: vec!["plain".to_owned(), "say \"hi\"".to_owned()],
        ..FlatTree::default()
    };
    assert_eq!(
        flat.to_subtree(ExpanderVersion::LATEST),
        Ok(Subtree::root(vec![
            Leaf::literal("r\"plain\"", LitKind::StrRaw, TokenId(0)).into(),
            Leaf::literal("br#\"say \"hi\"\"#", LitKind::ByteStrRaw, TokenId(1)).into(),
        ]))
    );
}

#[test]
fn test_deeply_nested_reply_decodes_and_drops() {
    // Subtree `i` holds only subtree `i + 1`; the last one is empty.
    let depth: u32 = 200_000;
    let mut subtree = Vec::new();
    for index in 0..depth {
        let kind = u32::from(index != 0);
        let end = if index + 1 == depth { index } else { index + 1 };
        subtree.extend([M, M, kind, index, end]);
    }
    let flat = FlatTree {
        subtree,
        token_tree: (1..depth).map(|child| child << 2).collect(),
        ..FlatTree::default()
    };

    let Ok(tree) = flat.to_subtree(ExpanderVersion::LATEST) else {
        panic!("deep but well-formed tree should decode");
    };
    let mut levels = 0;
    let mut cursor = &tree;
    while let Some(TokenTree::Subtree(child)) = cursor.token_trees.first() {
        levels += 1;
        cursor = child;
    }
    assert_eq!(levels, depth - 1);
    drop(tree);
}
