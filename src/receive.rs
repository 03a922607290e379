//! Receive screen artifacts: the send-route deep link and its QR code,
//! printed to the terminal and saved as a downloadable SVG.

use qrcode::render::{svg, unicode};
use qrcode::QrCode;

use crate::error::RemitError;

/// Deep link a scanner lands on: the send screen with the recipient
/// username pre-filled.
pub fn deep_link(origin: &str, username: &str) -> String {
    format!("{}/send?username={}", origin.trim_end_matches('/'), username)
}

/// Terminal rendering of the payment QR code.
pub fn qr_unicode(link: &str) -> Result<String, RemitError> {
    let code = QrCode::new(link.as_bytes())
        .map_err(|e| RemitError::Unknown(format!("QR generation error: {}", e)))?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .quiet_zone(true)
        .build())
}

/// Write the QR code as an SVG image; returns the path written.
pub fn save_qr_svg(link: &str, username: &str) -> Result<String, RemitError> {
    let code = QrCode::new(link.as_bytes())
        .map_err(|e| RemitError::Unknown(format!("QR generation error: {}", e)))?;
    let image = code
        .render()
        .min_dimensions(256, 256)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    let path = format!("payment-qr-{}.svg", username);
    std::fs::write(&path, image)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_link() {
        assert_eq!(
            deep_link("https://remitpay.app", "alice"),
            "https://remitpay.app/send?username=alice"
        );
        // Trailing slash on the origin doesn't double up
        assert_eq!(
            deep_link("https://remitpay.app/", "alice"),
            "https://remitpay.app/send?username=alice"
        );
    }

    #[test]
    fn test_qr_unicode_renders() {
        let link = deep_link("https://remitpay.app", "alice");
        let art = qr_unicode(&link).unwrap();
        assert!(!art.is_empty());
    }
}
