/// Ground the question in the retrieved chunks, separated by blank lines.
pub fn build_prompt<S: AsRef<str>>(context: &[S], question: &str) -> String {
    let context = context.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n\n");
    format!(
        "You are an HR assistant. Use this context to answer the question accurately.\n\nContext:\n{context}\n\nQuestion: {question}\nAnswer:"
    )
}
