const STATE_NAME_TO_CODE: [(&str, &str); 50] = [
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

const STATE_CODE_TO_FIPS: [(&str, &str); 51] = [
    ("AL", "01"),
    ("AK", "02"),
    ("AZ", "04"),
    ("AR", "05"),
    ("CA", "06"),
    ("CO", "08"),
    ("CT", "09"),
    ("DE", "10"),
    ("DC", "11"),
    ("FL", "12"),
    ("GA", "13"),
    ("HI", "15"),
    ("ID", "16"),
    ("IL", "17"),
    ("IN", "18"),
    ("IA", "19"),
    ("KS", "20"),
    ("KY", "21"),
    ("LA", "22"),
    ("ME", "23"),
    ("MD", "24"),
    ("MA", "25"),
    ("MI", "26"),
    ("MN", "27"),
    ("MS", "28"),
    ("MO", "29"),
    ("MT", "30"),
    ("NE", "31"),
    ("NV", "32"),
    ("NH", "33"),
    ("NJ", "34"),
    ("NM", "35"),
    ("NY", "36"),
    ("NC", "37"),
    ("ND", "38"),
    ("OH", "39"),
    ("OK", "40"),
    ("OR", "41"),
    ("PA", "42"),
    ("RI", "44"),
    ("SC", "45"),
    ("SD", "46"),
    ("TN", "47"),
    ("TX", "48"),
    ("UT", "49"),
    ("VT", "50"),
    ("VA", "51"),
    ("WA", "53"),
    ("WV", "54"),
    ("WI", "55"),
    ("WY", "56"),
];

pub const NORTHERN_STATES: [&str; 25] = [
    "Connecticut",
    "Delaware",
    "Illinois",
    "Indiana",
    "Iowa",
    "Maine",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Montana",
    "Nebraska",
    "New Hampshire",
    "New Jersey",
    "New York",
    "North Dakota",
    "Ohio",
    "Pennsylvania",
    "Rhode Island",
    "South Dakota",
    "Vermont",
    "Wisconsin",
    "Wyoming",
    "Idaho",
    "Oregon",
    "Washington",
];

pub const SOUTHERN_STATES: [&str; 21] = [
    "Alabama",
    "Arkansas",
    "Florida",
    "Georgia",
    "Kentucky",
    "Louisiana",
    "Maryland",
    "Mississippi",
    "Missouri",
    "North Carolina",
    "Oklahoma",
    "South Carolina",
    "Tennessee",
    "Texas",
    "Virginia",
    "West Virginia",
    "Arizona",
    "California",
    "Nevada",
    "New Mexico",
    "Utah",
];

/// Two-letter postal code for an exact full state name.
pub fn state_code(name: &str) -> Option<&'static str> {
    STATE_NAME_TO_CODE
        .iter()
        .find(|(state, _)| *state == name)
        .map(|(_, code)| *code)
}

/// Full state name for a postal code. DC has no entry.
pub fn state_name(code: &str) -> Option<&'static str> {
    STATE_NAME_TO_CODE
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(state, _)| *state)
}

pub fn state_fips(code: &str) -> Option<&'static str> {
    STATE_CODE_TO_FIPS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, fips)| *fips)
}

/// Title-case a state name the way the membership lists are spelled:
/// first letter of every alphabetic run upper-cased, the rest lower-cased.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_alpha = false;
    for ch in name.chars() {
        if ch.is_alphabetic() {
            if previous_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(ch);
            previous_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_and_fips_lookup() {
        assert_eq!(state_code("Texas"), Some("TX"));
        assert_eq!(state_fips("TX"), Some("48"));
        assert_eq!(state_code("District of Columbia"), None);
        assert_eq!(state_fips("DC"), Some("11"));
        assert_eq!(state_name("DC"), None);
        assert_eq!(state_name("WY"), Some("Wyoming"));
    }

    #[test]
    fn test_every_state_has_fips() {
        for (name, code) in STATE_NAME_TO_CODE {
            assert!(state_fips(code).is_some(), "no FIPS for {}", name);
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("WEST VIRGINIA"), "West Virginia");
        assert_eq!(title_case("texas"), "Texas");
    }

    #[test]
    fn test_membership_lists_are_disjoint() {
        for state in NORTHERN_STATES {
            assert!(!SOUTHERN_STATES.contains(&state));
        }
    }
}
