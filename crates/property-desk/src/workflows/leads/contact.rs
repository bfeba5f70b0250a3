//! Contact links for reaching a buyer from the leads inbox.
//!
//! Phone handling is deliberately loose: non-digits are stripped and Saudi local numbers get
//! the country code. There is no length or carrier validation.

use serde::{Deserialize, Serialize};

use crate::config::MarketplaceConfig;

pub const KSA_CALLING_CODE: &str = "966";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Call,
    Message,
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// `tel:` URI with the digits as typed.
pub fn tel_link(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }
    Some(format!("tel:{digits}"))
}

/// Number in the international form the messaging service expects.
pub fn whatsapp_number(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }

    let normalized = if let Some(local) = digits.strip_prefix('0') {
        format!("{KSA_CALLING_CODE}{local}")
    } else if digits.starts_with(KSA_CALLING_CODE) {
        digits
    } else if digits.starts_with('5') && digits.len() == 9 {
        format!("{KSA_CALLING_CODE}{digits}")
    } else {
        digits
    };
    Some(normalized)
}

/// What the greeting message should mention about the inquiry.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquiryContext<'a> {
    pub buyer_name: Option<&'a str>,
    pub listing_title: Option<&'a str>,
    pub listing_slug: Option<&'a str>,
}

/// Prefilled first message sent to the buyer.
pub fn inquiry_message(context: &InquiryContext<'_>, marketplace: &MarketplaceConfig) -> String {
    let greeting = match context.buyer_name.map(str::trim) {
        Some(name) if !name.is_empty() => format!("Hi {name},"),
        _ => "Hi,".to_string(),
    };
    let title = context
        .listing_title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or("the property");
    let link = match context.listing_slug.filter(|slug| !slug.is_empty()) {
        Some(slug) => format!("{}/property/{slug}", marketplace.site_url),
        None => marketplace.site_url.clone(),
    };

    format!(
        "{greeting}\n\n\
         Thanks for your inquiry about: {title}.\n\
         Here's the listing link:\n{link}\n\n\
         Can I know your preferred time for a viewing?\n\
         - {brand}",
        brand = marketplace.brand_name
    )
}

pub fn whatsapp_link(
    raw_phone: &str,
    context: &InquiryContext<'_>,
    marketplace: &MarketplaceConfig,
) -> Option<String> {
    let number = whatsapp_number(raw_phone)?;
    let message = inquiry_message(context, marketplace);
    Some(format!(
        "https://wa.me/{number}?text={}",
        urlencoding::encode(&message)
    ))
}
