#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use super::LoginResponse;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    cookie: String,
    pub username: String,
    pub role: Option<String>,
}

/// Reduces `Set-Cookie` values to the `name=value` pairs a client sends back,
/// joined into a single `Cookie` header.
pub fn cookie_header(set_cookies: &[String]) -> String {
    return set_cookies
        .iter()
        .filter_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            if pair.is_empty() {
                return None;
            }
            return Some(pair);
        })
        .collect::<Vec<&str>>()
        .join("; ");
}

fn cookie_name(pair: &str) -> &str {
    return pair.split('=').next().unwrap_or_default().trim();
}

impl Session {
    pub fn new(set_cookies: &[String], login: LoginResponse) -> Session {
        return Session {
            cookie: cookie_header(set_cookies),
            username: login.username,
            role: login.role,
        };
    }

    pub fn cookie(&self) -> Option<&str> {
        if self.cookie.is_empty() {
            return None;
        }

        return Some(&self.cookie);
    }

    /// Merges rotated cookies into the session by name, keeping cookies the
    /// server did not resend. Responses without `Set-Cookie` headers leave the
    /// session untouched.
    pub fn refresh(&mut self, set_cookies: &[String]) -> bool {
        let rotated = cookie_header(set_cookies);
        if rotated.is_empty() {
            return false;
        }

        let mut pairs = self
            .cookie
            .split("; ")
            .filter(|pair| return !pair.is_empty())
            .map(|pair| return pair.to_string())
            .collect::<Vec<String>>();

        for pair in rotated.split("; ") {
            let name = cookie_name(pair);
            match pairs.iter_mut().find(|e| return cookie_name(e) == name) {
                Some(existing) => *existing = pair.to_string(),
                None => pairs.push(pair.to_string()),
            }
        }

        let cookie = pairs.join("; ");
        if cookie == self.cookie {
            return false;
        }

        self.cookie = cookie;
        return true;
    }
}
