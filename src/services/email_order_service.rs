use chrono::{DateTime, Utc};

use crate::{
    domain::{cart::Cart, money::format_price, order::OrderValidationError},
    dto::orders::{EmailOrderRequest, EmailOrderResponse},
    error::{AppError, AppResult},
    middleware::session::CustomerSession,
    models::normalize_language,
    notify::EmailTemplateParams,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

/// Sends the cart to the restaurant by email instead of storing an order.
pub async fn send_email_order(
    state: &AppState,
    session: CustomerSession,
    payload: EmailOrderRequest,
) -> AppResult<ApiResponse<EmailOrderResponse>> {
    let language = normalize_language(payload.language.as_deref());
    if payload.customer_name.trim().is_empty() || payload.customer_phone.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please fill in name and phone number".into(),
        ));
    }

    let cart = cart_service::read_cart(state, session).await?;
    if cart.is_empty() {
        return Err(OrderValidationError::EmptyCart.into());
    }

    let params = build_template_params(&cart, &payload, &language, Utc::now());
    state.notifier.send_order(&params).await.inspect_err(|err| {
        tracing::error!(error = %err, session = %session.id(), "order email failed");
    })?;

    cart_service::clear_after_order(state, session).await;
    Ok(ApiResponse::success(
        "Order sent",
        EmailOrderResponse { sent: true, params },
        Some(Meta::empty()),
    ))
}

pub fn build_template_params(
    cart: &Cart,
    request: &EmailOrderRequest,
    language: &str,
    now: DateTime<Utc>,
) -> EmailTemplateParams {
    let order_items = cart
        .lines()
        .iter()
        .map(|line| {
            format!(
                "{} x{} - {}",
                line.name.get(language),
                line.quantity,
                format_price(line.line_total())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    EmailTemplateParams {
        customer_name: request.customer_name.trim().to_string(),
        customer_phone: request.customer_phone.trim().to_string(),
        customer_email: non_blank(request.customer_email.as_deref())
            .unwrap_or_else(|| "Not provided".to_string()),
        order_items,
        order_total: format_price(cart.total_price()),
        order_notes: non_blank(request.notes.as_deref()).unwrap_or_else(|| "None".to_string()),
        order_time: format_order_time(now, language),
    }
}

fn format_order_time(now: DateTime<Utc>, language: &str) -> String {
    let pattern = match language {
        "fi" => "%d.%m.%Y klo %H.%M",
        _ => "%d/%m/%Y, %H:%M",
    };
    now.format(pattern).to_string()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;
    use crate::models::{LocalizedText, MenuItem};

    fn item(en: &str, fi: &str, price: i64) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            name: LocalizedText::new(en, fi),
            description: LocalizedText::default(),
            price,
            prep_time: 5,
            category: "food".into(),
            badge: None,
            customizations: None,
            available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(email: Option<&str>, notes: Option<&str>) -> EmailOrderRequest {
        EmailOrderRequest {
            customer_name: " Aino ".into(),
            customer_phone: "040 123 4567".into(),
            customer_email: email.map(str::to_string),
            notes: notes.map(str::to_string),
            language: None,
        }
    }

    #[test]
    fn template_params_follow_the_email_layout() {
        let espresso = item("Espresso", "Espresso", 350);
        let burger = item("Burger & Fries", "Burgeri & ranskalaiset", 1490);
        let mut cart = Cart::new();
        cart.add_line(&espresso, None).unwrap();
        cart.add_line(&espresso, None).unwrap();
        cart.add_line(&burger, None).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 0).unwrap();

        let params = build_template_params(&cart, &request(None, Some("  ")), "en", now);
        assert_eq!(params.customer_name, "Aino");
        assert_eq!(params.customer_email, "Not provided");
        assert_eq!(params.order_notes, "None");
        assert_eq!(
            params.order_items,
            "Espresso x2 - €7.00\nBurger & Fries x1 - €14.90"
        );
        assert_eq!(params.order_total, "€21.90");
        assert_eq!(params.order_time, "14/03/2026, 09:05");
    }

    #[test]
    fn finnish_orders_use_finnish_names_and_time() {
        let burger = item("Burger & Fries", "Burgeri & ranskalaiset", 1490);
        let mut cart = Cart::new();
        cart.add_line(&burger, None).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 18, 30, 0).unwrap();

        let request = request(Some("aino@example.com"), Some("No onions"));
        let params = build_template_params(&cart, &request, "fi", now);
        assert_eq!(params.order_items, "Burgeri & ranskalaiset x1 - €14.90");
        assert_eq!(params.customer_email, "aino@example.com");
        assert_eq!(params.order_notes, "No onions");
        assert_eq!(params.order_time, "14.03.2026 klo 18.30");
    }
}
