/// Strips the module path from a fully-qualified type name, e.g.
/// `feed_ranker::filters::age_filter::AgeFilter` becomes `AgeFilter`.
pub fn short_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    match path.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
