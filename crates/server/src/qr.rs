//! Pairing credential synthesis
//!
//! The credential is an opaque scannable reference for the phone being
//! paired: a QR code rendered to SVG and wrapped in a data URI, so the
//! dashboard can drop it straight into an `<img>` tag. The payload embeds
//! a one-shot token; a real device-linking backend would replace the
//! payload format without touching the event contract.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::QrCode;

use zaplink_protocol::new_id;

/// Build the scannable credential for `phone`
pub fn pairing_credential(phone: &str) -> Result<String, QrError> {
    let payload = format!("zaplink:pair:{}:{}", phone, new_id());
    let code = QrCode::new(payload.as_bytes())?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .quiet_zone(true)
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_is_an_svg_data_uri() {
        let credential = pairing_credential("+5511912345678").expect("build credential");
        assert!(credential.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn credentials_for_the_same_phone_are_unique() {
        let first = pairing_credential("+5511912345678").expect("first credential");
        let second = pairing_credential("+5511912345678").expect("second credential");
        assert_ne!(first, second);
    }
}
