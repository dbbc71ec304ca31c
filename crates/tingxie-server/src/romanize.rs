//! Hanzi to tone-numbered pinyin.

use pinyin::ToPinyin;

/// Convert `text` to space-separated pinyin with trailing tone digits.
///
/// Every Han character becomes its own token. Runs of anything else (Latin
/// words, digits, punctuation) are kept verbatim as a single token with
/// surrounding whitespace removed.
pub fn to_pinyin(text: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut run = String::new();

    for ch in text.chars() {
        match ch.to_pinyin() {
            Some(syllable) => {
                flush_run(&mut run, &mut tokens);
                tokens.push(with_tone_digit(syllable.with_tone_num_end()));
            }
            None => run.push(ch),
        }
    }
    flush_run(&mut run, &mut tokens);

    tokens.join(" ")
}

/// Neutral-tone syllables carry no digit from the table; they get `5`.
fn with_tone_digit(syllable: &str) -> String {
    if syllable.ends_with(|c: char| c.is_ascii_digit()) {
        syllable.to_string()
    } else {
        format!("{syllable}5")
    }
}

fn flush_run(run: &mut String, tokens: &mut Vec<String>) {
    let trimmed = run.trim();
    if !trimmed.is_empty() {
        tokens.push(trimmed.to_string());
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_hanzi() {
        assert_eq!(to_pinyin("你好"), "ni3 hao3");
        assert_eq!(to_pinyin("中国"), "zhong1 guo2");
    }

    #[test]
    fn test_neutral_tone_gets_digit() {
        assert_eq!(to_pinyin("我的妈妈"), "wo3 de5 ma1 ma1");
        assert_eq!(to_pinyin("了吗"), "le5 ma5");
        assert_eq!(to_pinyin("儿子们"), "er2 zi5 men5");
    }

    #[test]
    fn test_every_han_token_ends_in_digit() {
        let out = to_pinyin("我们的孩子吗");
        assert_eq!(out.split(' ').count(), 6);
        assert!(out
            .split(' ')
            .all(|token| token.ends_with(|c: char| c.is_ascii_digit())));
    }

    #[test]
    fn test_with_tone_digit() {
        assert_eq!(with_tone_digit("hao3"), "hao3");
        assert_eq!(with_tone_digit("de"), "de5");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(to_pinyin(""), "");
        assert_eq!(to_pinyin("   \n"), "");
    }

    #[test]
    fn test_mixed_text_keeps_runs() {
        assert_eq!(to_pinyin("我爱Rust"), "wo3 ai4 Rust");
        assert_eq!(to_pinyin("你好，世界"), "ni3 hao3 ， shi4 jie4");
    }

    #[test]
    fn test_non_han_run_is_trimmed_not_split() {
        assert_eq!(to_pinyin("  hello world  "), "hello world");
        assert_eq!(to_pinyin("谢谢 OK 谢谢"), "xie4 xie4 OK xie4 xie4");
    }
}
