//! Source text from an expanded token tree.
//!
//! Tokens with source metadata are emitted with their original trailing
//! trivia and recorded in the range table. Everything else gets a
//! synthesized single space where one is needed.

use pmx_stack::ensure_sufficient_stack;
use pmx_tt::{
    Delimiter, Leaf, MappedTextRange, RangeMap, Spacing, Subtree, TokenMap, TokenTree,
};

/// Render `subtree` and map spans of the result back to token map offsets.
///
/// Pure: the same tree and map always give the same text and ranges.
pub fn to_mapped_text(subtree: &Subtree, token_map: &TokenMap) -> (String, RangeMap) {
    let mut builder = TextBuilder {
        token_map,
        text: String::new(),
        ranges: RangeMap::new(),
    };
    builder.subtree(subtree, true);
    (builder.text, builder.ranges)
}

#[derive(Copy, Clone)]
enum Part {
    Open,
    Close,
}

struct TextBuilder<'m> {
    token_map: &'m TokenMap,
    text: String,
    ranges: RangeMap,
}

impl TextBuilder<'_> {
    fn subtree(&mut self, subtree: &Subtree, is_root: bool) {
        if let Some(delimiter) = subtree.delimiter {
            self.delimiter_part(delimiter, Part::Open);
        }
        let has_delimiter = is_root || subtree.delimiter.is_some();
        let mut token_trees = subtree.token_trees.iter().peekable();
        while let Some(tt) = token_trees.next() {
            match tt {
                TokenTree::Leaf(leaf) => self.leaf(leaf, token_trees.peek().copied(), has_delimiter),
                TokenTree::Subtree(child) => ensure_sufficient_stack(|| self.subtree(child, false)),
            }
        }
        if let Some(delimiter) = subtree.delimiter {
            self.delimiter_part(delimiter, Part::Close);
        }
    }

    fn leaf(&mut self, leaf: &Leaf, next: Option<&TokenTree>, has_delimiter: bool) {
        // Metadata only counts if the id still names this exact token.
        let meta = self
            .token_map
            .token(leaf.id())
            .filter(|meta| meta.origin.is_same_token(leaf));
        if let Some(meta) = meta {
            self.ranges.merge_add(MappedTextRange::new(
                meta.start_offset,
                self.text.len(),
                leaf.text_len() + meta.right_trivia.len(),
            ));
        }
        leaf.push_text(&mut self.text);

        let trivia = meta.map_or("", |meta| meta.right_trivia.as_str());
        self.text.push_str(trivia);
        if trivia.is_empty()
            && leaf.spacing() == Spacing::Alone
            && !can_omit_space(leaf, next, has_delimiter)
        {
            self.text.push(' ');
        }
    }

    fn delimiter_part(&mut self, delimiter: Delimiter, part: Part) {
        let meta = self.token_map.delimiter(delimiter.id).and_then(|meta| match part {
            Part::Open => Some(&meta.open),
            Part::Close => meta.close.as_ref(),
        });
        if let Some(meta) = meta {
            self.ranges.merge_add(MappedTextRange::new(
                meta.start_offset,
                self.text.len(),
                1 + meta.right_trivia.len(),
            ));
        }
        self.text.push(match part {
            Part::Open => delimiter.kind.open_char(),
            Part::Close => delimiter.kind.close_char(),
        });
        if let Some(meta) = meta {
            self.text.push_str(&meta.right_trivia);
        }
    }
}

/// Whether the space after `leaf` can be left out.
fn can_omit_space(leaf: &Leaf, next: Option<&TokenTree>, has_delimiter: bool) -> bool {
    match next {
        // `let x = 0;`: `0` and `;` were adjacent in source
        Some(TokenTree::Leaf(next)) => leaf.id().successor() == Some(next.id()),
        // `f()`: never a space before an opening delimiter
        Some(TokenTree::Subtree(_)) => true,
        // `f(1)`: nor before a closing one
        None => has_delimiter,
    }
}
