/// Local subscriber numbers are eight digits long.
const SUBSCRIBER_DIGITS: usize = 8;

/// Splits a free-form phone number into `(country_code, number)` the way the gateway expects them.
///
/// Anything that is not a digit is dropped. When the number carries more than eight digits the leading digits are
/// taken as the country code, otherwise `default_country_code` is used.
pub fn split_phone_number(phone: &str, default_country_code: &str) -> (String, String) {
    let digits = phone.chars().filter(char::is_ascii_digit).collect::<String>();
    if digits.len() > SUBSCRIBER_DIGITS {
        let (cc, number) = digits.split_at(digits.len() - SUBSCRIBER_DIGITS);
        (cc.trim_start_matches('0').to_string(), number.to_string())
    } else {
        (default_country_code.to_string(), digits)
    }
}

/// Charge ids are made of ASCII letters, digits and underscores, e.g. `chg_TS01A2520231400Rs8k0809392`. Ids arrive
/// from customer redirects and webhooks and end up in a URL path, so anything else is refused.
pub fn is_valid_charge_id(charge_id: &str) -> bool {
    !charge_id.is_empty() && charge_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
