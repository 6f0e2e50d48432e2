pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn cookie(name: &str, value: &str, secure: bool) -> String {
    let secure = if secure { " Secure;" } else { "" };
    format!("{name}={value}; HttpOnly; Max-Age=86400;{secure} Path=/; SameSite=Strict")
}

/// "1 team" / "3 teams".
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_marks_secure_only_when_asked() {
        assert!(cookie("a", "b", true).contains("Secure"));
        assert!(!cookie("a", "b", false).contains("Secure"));
        assert!(cookie("a", "b", false).starts_with("a=b;"));
    }

    #[test]
    fn plural_picks_form_by_count() {
        assert_eq!(plural(1, "team", "teams"), "1 team");
        assert_eq!(plural(0, "team", "teams"), "0 teams");
        assert_eq!(plural(4, "team", "teams"), "4 teams");
    }
}
