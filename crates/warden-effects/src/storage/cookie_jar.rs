//! `document.cookie` parsing

/// Value of cookie `name` in a `document.cookie` string
pub fn find_cookie<'a>(jar: &'a str, name: &str) -> Option<&'a str> {
    jar.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_named_cookie_among_several() {
        let jar = "theme=dark; ___h8_ban_lock___=%7B%22banned%22%3Atrue%7D;lang=en";
        assert_eq!(
            find_cookie(jar, "___h8_ban_lock___"),
            Some("%7B%22banned%22%3Atrue%7D")
        );
        assert_eq!(find_cookie(jar, "theme"), Some("dark"));
        assert_eq!(find_cookie(jar, "lang"), Some("en"));
    }

    #[test]
    fn missing_name_is_none() {
        assert_eq!(find_cookie("theme=dark; lang=en", "session"), None);
        assert_eq!(find_cookie("", "session"), None);
        assert_eq!(find_cookie("flagonly; other", "flagonly"), None);
    }

    #[test]
    fn prefix_of_another_name_does_not_match() {
        let jar = "ban_lock_old=1; ban_lock=2";
        assert_eq!(find_cookie(jar, "ban_lock"), Some("2"));
        assert_eq!(find_cookie("ban_lock_old=1", "ban_lock"), None);
        assert_eq!(find_cookie("ban_lock=1", "ban"), None);
    }

    #[test]
    fn value_keeps_embedded_equals_and_may_be_empty() {
        assert_eq!(find_cookie("token=a=b=c", "token"), Some("a=b=c"));
        assert_eq!(find_cookie("token=; x=1", "token"), Some(""));
    }
}
