use std::sync::LazyLock;

use am_core::{ImageKind, ImageToken, ParserConfig, Span};
use regex::{Captures, Regex};

static IMAGE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(image|logo|img)_([0-9]+)_([0-9]+)(?:\|([0-9]+)x([0-9]+))?\]")
        .expect("image token pattern is valid")
});

static AGENT_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:image|logo|img)_([0-9]+)_([0-9]+)").expect("agent image pattern is valid")
});

/// Default square size for a token kind: 20 for `image`/`img`, 30 for `logo`.
#[must_use]
pub fn default_image_size(kind: ImageKind) -> (u32, u32) {
    ParserConfig::default().default_image_size(kind)
}

/// First image token in `text`, sized with the default constants.
#[must_use]
pub fn parse_image_token(text: &str) -> Option<ImageToken> {
    parse_image_token_with(text, &ParserConfig::default())
}

#[must_use]
pub fn parse_image_token_with(text: &str, config: &ParserConfig) -> Option<ImageToken> {
    IMAGE_TOKEN_RE
        .captures(text)
        .and_then(|captures| token_from(&captures, config))
}

/// Every image token in `text`, in document order.
#[must_use]
pub fn find_image_tokens(text: &str) -> Vec<ImageToken> {
    image_token_spans(text, &ParserConfig::default())
        .into_iter()
        .map(|(_, token)| token)
        .collect()
}

/// Image tokens together with their byte spans in `text`.
#[must_use]
pub fn image_token_spans(text: &str, config: &ParserConfig) -> Vec<(Span, ImageToken)> {
    IMAGE_TOKEN_RE
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let token = token_from(&captures, config)?;
            Some((Span::new(whole.start(), whole.end()), token))
        })
        .collect()
}

/// Remove every image token, then trim the result.
#[must_use]
pub fn remove_image_tokens(text: &str) -> String {
    IMAGE_TOKEN_RE.replace_all(text, "").trim().to_string()
}

/// `{base}ai/{id}/image?seq={seq}`
#[must_use]
pub fn build_image_url(base_url: &str, resource_id: &str, sequence_id: &str) -> String {
    format!("{base_url}ai/{resource_id}/image?seq={sequence_id}")
}

/// Build an image URL from a loosely written token such as `image_51_1` or
/// `[logo_7_2|40x40]`. `None` when no `kind_id_seq` is present.
#[must_use]
pub fn build_agent_image_url(token_text: &str, base_url: &str) -> Option<String> {
    let captures = AGENT_IMAGE_RE.captures(token_text)?;
    let resource_id = captures.get(1)?.as_str();
    let sequence_id = captures.get(2)?.as_str();
    Some(build_image_url(base_url, resource_id, sequence_id))
}

fn token_from(captures: &Captures<'_>, config: &ParserConfig) -> Option<ImageToken> {
    let kind = ImageKind::from_name(captures.get(1)?.as_str())?;
    let resource_id = captures.get(2)?.as_str().to_string();
    let sequence_id = captures.get(3)?.as_str().to_string();
    let (default_width, default_height) = config.default_image_size(kind);

    // ASCII digits only, so a failed parse is an overflow.
    let explicit = |index: usize| {
        captures
            .get(index)
            .map(|digits| digits.as_str().parse::<u32>().unwrap_or(u32::MAX))
    };
    let width = explicit(4).unwrap_or(default_width);
    let height = explicit(5).unwrap_or(default_height);

    Some(ImageToken {
        kind,
        resource_id,
        sequence_id,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use am_core::{ImageKind, ImageToken, ParserConfig, Span};

    use super::{
        build_agent_image_url, build_image_url, default_image_size, find_image_tokens,
        image_token_spans, parse_image_token, parse_image_token_with, remove_image_tokens,
    };

    fn token(kind: ImageKind, id: &str, seq: &str, width: u32, height: u32) -> ImageToken {
        ImageToken {
            kind,
            resource_id: id.to_string(),
            sequence_id: seq.to_string(),
            width,
            height,
        }
    }

    #[test]
    fn image_without_size_uses_kind_default() {
        assert_eq!(
            parse_image_token("[image_7_1]"),
            Some(token(ImageKind::Image, "7", "1", 20, 20))
        );
        assert_eq!(
            parse_image_token("[img_3_9]"),
            Some(token(ImageKind::Img, "3", "9", 20, 20))
        );
        assert_eq!(
            parse_image_token("[logo_4_2]"),
            Some(token(ImageKind::Logo, "4", "2", 30, 30))
        );
    }

    #[test]
    fn explicit_size_overrides_default() {
        assert_eq!(
            parse_image_token("[logo_7_1|50x60]"),
            Some(token(ImageKind::Logo, "7", "1", 50, 60))
        );
    }

    #[test]
    fn configured_defaults_apply() {
        let config = ParserConfig {
            image_default_size: 16,
            ..ParserConfig::default()
        };
        assert_eq!(
            parse_image_token_with("[image_1_1]", &config).map(|t| (t.width, t.height)),
            Some((16, 16))
        );
    }

    #[test]
    fn malformed_tokens_are_not_found() {
        for text in ["image_7_1", "[image_7]", "[icon_7_1]", "[image_a_1]", "[image_7_1|50]"] {
            assert_eq!(parse_image_token(text), None, "{text}");
        }
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        for text in [
            "[image_\u{0663}_1]",
            "[image_3_\u{0661}]",
            "[image_\u{0663}_1|\u{0665}0x60]",
            "[logo_1_1|\u{FF15}x5]",
        ] {
            assert_eq!(parse_image_token(text), None, "{text}");
            assert_eq!(remove_image_tokens(text), text);
        }
        assert_eq!(build_agent_image_url("image_\u{0663}_1", "/"), None);
    }

    #[test]
    fn oversized_dimensions_saturate() {
        assert_eq!(
            parse_image_token("[image_1_1|99999999999x5]").map(|t| (t.width, t.height)),
            Some((u32::MAX, 5))
        );
    }

    #[test]
    fn find_all_keeps_document_order() {
        let found = find_image_tokens("a [logo_1_1] b [image_2_3|10x12] c");
        assert_eq!(
            found,
            vec![
                token(ImageKind::Logo, "1", "1", 30, 30),
                token(ImageKind::Image, "2", "3", 10, 12),
            ]
        );
    }

    #[test]
    fn spans_locate_tokens() {
        let spans = image_token_spans("ab[img_1_2]", &ParserConfig::default());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, Span::new(2, 11));
    }

    #[test]
    fn remove_strips_all_tokens_and_trims() {
        assert_eq!(remove_image_tokens("[image_1_1] Buy now [logo_2_2|5x5] "), "Buy now");
        assert_eq!(remove_image_tokens("no tokens"), "no tokens");
    }

    #[test]
    fn url_builders() {
        assert_eq!(
            build_image_url("https://cdn.example/", "51", "1"),
            "https://cdn.example/ai/51/image?seq=1"
        );
        assert_eq!(
            build_agent_image_url("[image_51_1|20x20]", "https://cdn.example/").as_deref(),
            Some("https://cdn.example/ai/51/image?seq=1")
        );
        assert_eq!(
            build_agent_image_url("logo_9_4", "/").as_deref(),
            Some("/ai/9/image?seq=4")
        );
        assert_eq!(build_agent_image_url("[picture]", "/"), None);
    }

    #[test]
    fn default_sizes() {
        assert_eq!(default_image_size(ImageKind::Image), (20, 20));
        assert_eq!(default_image_size(ImageKind::Img), (20, 20));
        assert_eq!(default_image_size(ImageKind::Logo), (30, 30));
    }
}
