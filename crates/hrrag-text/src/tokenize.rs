/// Split on whitespace runs. No case folding, stemming or stopword removal, so
/// `"leave."` and `"leave"` are different terms.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
