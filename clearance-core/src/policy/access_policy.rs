use super::{Error, QualifiedAttribute};
use std::{
    collections::{HashSet, LinkedList},
    ops::{BitAnd, BitOr},
};

const AND: &str = "AND";
const OR: &str = "OR";

/// A monotone boolean formula over attributes.
///
/// Textual form: `attr (AND|OR) attr | ( ... )`, `AND` binding tighter than
/// `OR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    Term(QualifiedAttribute),
    Conjunction(Box<AccessPolicy>, Box<AccessPolicy>),
    Disjunction(Box<AccessPolicy>, Box<AccessPolicy>),
}

impl BitAnd for AccessPolicy {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::Conjunction(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for AccessPolicy {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Disjunction(Box::new(self), Box::new(rhs))
    }
}

impl AccessPolicy {
    /// Byte offset of the parenthesis closing the group `boolean_expression`
    /// starts in.
    fn find_matching_closing_parenthesis(boolean_expression: &str) -> Result<usize, Error> {
        let mut count = 0;
        for (index, c) in boolean_expression.char_indices() {
            match c {
                '(' => count += 1,
                ')' => count -= 1,
                _ => {},
            };
            if count < 0 {
                return Ok(index);
            }
        }
        Err(Error::InvalidBooleanExpression(format!(
            "Missing closing parenthesis in boolean expression {boolean_expression}"
        )))
    }

    /// Strip a leading operator keyword, which must be followed by a delimiter.
    fn strip_operator<'a>(e: &'a str, keyword: &str) -> Option<&'a str> {
        let rest = e.strip_prefix(keyword)?;
        if rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
            Some(rest)
        } else {
            None
        }
    }

    pub fn parse(mut e: &str) -> Result<Self, Error> {
        let seeker = |c: &char| !c.is_whitespace() && !"()".contains(*c);
        let mut q = LinkedList::<Self>::new();
        // set after AND, cleared once the right operand is read
        let mut awaiting_operand = false;
        loop {
            e = e.trim_start();

            if e.is_empty() {
                if awaiting_operand {
                    return Err(Error::InvalidBooleanExpression(
                        "trailing AND operator".to_string(),
                    ));
                }
                return match q.pop_front() {
                    Some(first) => Ok(Self::conjugate(first, q.into_iter())),
                    None => Err(Error::InvalidBooleanExpression(
                        "empty string is not a valid access policy".to_string(),
                    )),
                };
            }

            if let Some(rest) = Self::strip_operator(e, OR) {
                if awaiting_operand {
                    return Err(Error::InvalidBooleanExpression(format!(
                        "missing operand before OR in '{e}'"
                    )));
                }
                let base = q.pop_front().ok_or_else(|| {
                    Error::InvalidBooleanExpression(format!("leading OR operand in '{e}'"))
                })?;
                let lhs = Self::conjugate(base, q.into_iter());
                return Ok(lhs | Self::parse(rest)?);
            }

            if let Some(rest) = Self::strip_operator(e, AND) {
                if q.is_empty() || awaiting_operand {
                    return Err(Error::InvalidBooleanExpression(format!(
                        "leading AND operand in '{e}'"
                    )));
                }
                awaiting_operand = true;
                e = rest;
                continue;
            }

            if !q.is_empty() && !awaiting_operand {
                return Err(Error::InvalidBooleanExpression(format!(
                    "missing operator before '{e}'"
                )));
            }

            match e.chars().next() {
                Some('(') => {
                    let offset = Self::find_matching_closing_parenthesis(&e[1..])?;
                    q.push_back(Self::parse(&e[1..1 + offset]).map_err(|err| {
                        Error::InvalidBooleanExpression(format!("error while parsing '{e}': {err}"))
                    })?);
                    e = &e[2 + offset..];
                },
                Some(')') => {
                    return Err(Error::InvalidBooleanExpression(format!(
                        "unmatched closing parenthesis in '{e}'"
                    )));
                },
                _ => {
                    let attr: String = e.chars().take_while(seeker).collect();
                    q.push_back(Self::Term(QualifiedAttribute::try_from(attr.as_str())?));
                    e = &e[attr.len()..];
                },
            }
            awaiting_operand = false;
        }
    }

    fn conjugate(first: Self, policies: impl Iterator<Item = Self>) -> Self {
        policies.fold(first, |res, operand| res & operand)
    }

    #[must_use]
    pub fn to_dnf(&self) -> Vec<Vec<QualifiedAttribute>> {
        match self {
            Self::Term(attr) => vec![vec![attr.clone()]],
            Self::Conjunction(lhs, rhs) => {
                let combinations_left = lhs.to_dnf();
                let combinations_right = rhs.to_dnf();
                let mut res =
                    Vec::with_capacity(combinations_left.len() * combinations_right.len());
                for value_left in combinations_left {
                    for value_right in &combinations_right {
                        res.push([value_left.as_slice(), value_right.as_slice()].concat());
                    }
                }
                res
            },
            Self::Disjunction(lhs, rhs) => [lhs.to_dnf(), rhs.to_dnf()].concat(),
        }
    }

    /// Whether holding exactly `attributes` satisfies the formula.
    #[must_use]
    pub fn is_satisfied_by(&self, attributes: &HashSet<QualifiedAttribute>) -> bool {
        match self {
            Self::Term(attr) => attributes.contains(attr),
            Self::Conjunction(lhs, rhs) => {
                lhs.is_satisfied_by(attributes) && rhs.is_satisfied_by(attributes)
            },
            Self::Disjunction(lhs, rhs) => {
                lhs.is_satisfied_by(attributes) || rhs.is_satisfied_by(attributes)
            },
        }
    }

    /// Distinct attributes mentioned by the formula, in order of appearance.
    #[must_use]
    pub fn attributes(&self) -> Vec<QualifiedAttribute> {
        fn collect(policy: &AccessPolicy, out: &mut Vec<QualifiedAttribute>) {
            match policy {
                AccessPolicy::Term(attr) => {
                    if !out.contains(attr) {
                        out.push(attr.clone());
                    }
                },
                AccessPolicy::Conjunction(lhs, rhs) | AccessPolicy::Disjunction(lhs, rhs) => {
                    collect(lhs, out);
                    collect(rhs, out);
                },
            }
        }
        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }
}

impl std::fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Term(attr) => write!(f, "{attr}"),
            Self::Conjunction(lhs, rhs) => {
                for (i, operand) in [lhs, rhs].into_iter().enumerate() {
                    if i > 0 {
                        write!(f, " {AND} ")?;
                    }
                    match operand.as_ref() {
                        Self::Disjunction(..) => write!(f, "({operand})")?,
                        _ => write!(f, "{operand}")?,
                    }
                }
                Ok(())
            },
            Self::Disjunction(lhs, rhs) => write!(f, "{lhs} {OR} {rhs}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> AccessPolicy {
        AccessPolicy::Term(QualifiedAttribute::try_from(s).unwrap())
    }

    #[test]
    fn test_access_policy_parsing() {
        let ap = AccessPolicy::parse("department:1 AND (level:3 OR level:4)").unwrap();
        assert_eq!(ap, term("department:1") & (term("level:3") | term("level:4")));

        let ap = AccessPolicy::parse("department:1 AND level:3 OR level:4").unwrap();
        assert_eq!(ap, (term("department:1") & term("level:3")) | term("level:4"));

        let ap = AccessPolicy::parse("level:4 OR department:1 AND level:3").unwrap();
        assert_eq!(ap, term("level:4") | (term("department:1") & term("level:3")));

        let ap = AccessPolicy::parse("((department:1))AND(level:4)").unwrap();
        assert_eq!(ap, term("department:1") & term("level:4"));

        assert!(AccessPolicy::parse("").is_err());
        assert!(AccessPolicy::parse("level").is_err());
        assert!(AccessPolicy::parse("department:1 (level:3 OR level:4)").is_err());
        assert!(AccessPolicy::parse("department:1 AND (AND level:3)").is_err());
        assert!(AccessPolicy::parse("OR level:2").is_err());
        assert!(AccessPolicy::parse("level:2 AND").is_err());
        assert!(AccessPolicy::parse("level:2 AND OR level:3").is_err());
        assert!(AccessPolicy::parse("(level:2").is_err());
        assert!(AccessPolicy::parse("level:2)").is_err());
    }

    #[test]
    fn test_operator_keywords_need_delimiters() {
        // `ORACLE` is an attribute dimension, not an operator
        let ap = AccessPolicy::parse("ORACLE:1 AND ANDROID:2").unwrap();
        assert_eq!(ap, term("ORACLE:1") & term("ANDROID:2"));
    }

    #[test]
    fn test_display_round_trip() {
        for policy in [
            "department:1 AND (level:3 OR level:4)",
            "department:1 AND level:4",
            "level:1 OR level:2 OR level:3",
        ] {
            let ap = AccessPolicy::parse(policy).unwrap();
            assert_eq!(ap.to_string(), policy);
            assert_eq!(AccessPolicy::parse(&ap.to_string()).unwrap(), ap);
        }
    }

    #[test]
    fn test_dnf_and_evaluation() {
        let ap = AccessPolicy::parse("department:1 AND (level:3 OR level:4)").unwrap();
        let dnf = ap.to_dnf();
        assert_eq!(dnf.len(), 2);
        assert_eq!(dnf[0], vec![
            QualifiedAttribute::new("department", "1"),
            QualifiedAttribute::new("level", "3")
        ]);

        let holder = |attrs: &[&str]| {
            attrs
                .iter()
                .map(|a| QualifiedAttribute::try_from(*a).unwrap())
                .collect::<HashSet<_>>()
        };
        assert!(ap.is_satisfied_by(&holder(&["department:1", "level:4"])));
        assert!(!ap.is_satisfied_by(&holder(&["department:2", "level:4"])));
        assert!(!ap.is_satisfied_by(&holder(&["department:1", "level:2"])));
        assert!(!ap.is_satisfied_by(&holder(&["level:3", "level:4"])));

        assert_eq!(ap.attributes().len(), 3);
    }
}
