use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        cart::{Cart, CartLine},
        customization::{CustomizationSelection, Selection},
        status::OrderStatus,
        tracking::{TrackingStep, TrackingView},
    },
    dto::{
        auth::{LoginRequest, LoginResponse},
        cart::{AddToCartRequest, CartLineView, CartView},
        kitchen::{KitchenOrderList, StatusCounts, UpdateOrderStatusRequest},
        menu::{
            AvailabilityRequest, CategoryList, CreateMenuItemRequest, MenuItemList, MenuSection,
            MenuView, UpdateMenuItemRequest, UpsertCategoryRequest,
        },
        orders::{
            EmailOrderRequest, EmailOrderResponse, LastOrderResponse, OrderFormDefaults,
            SubmitOrderRequest, SubmitOrderResponse, TableNumberInput,
        },
    },
    error::ErrorData,
    models::{
        Badge, CustomizationCategory, CustomizationOption, LocalizedText, MenuCategory, MenuItem,
        Order, OrderLine, SelectionType, TodaySpecial, User,
    },
    notify::EmailTemplateParams,
    response::{ApiResponse, Meta},
    routes::{auth, cart, health, kitchen, menu, menu_admin, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        menu::get_menu,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_item,
        cart::remove_line,
        cart::clear_cart,
        orders::submit_order,
        orders::order_form,
        orders::email_order,
        orders::get_tracking,
        orders::order_events,
        orders::last_order,
        auth::login,
        auth::logout,
        auth::me,
        kitchen::list_orders,
        kitchen::get_order,
        kitchen::update_order_status,
        kitchen::advance_order,
        kitchen::delete_order,
        kitchen::order_feed,
        menu_admin::list_items,
        menu_admin::create_item,
        menu_admin::update_item,
        menu_admin::set_availability,
        menu_admin::delete_item,
        menu_admin::list_categories,
        menu_admin::upsert_category,
        menu_admin::delete_category,
        menu_admin::get_special,
        menu_admin::set_special
    ),
    components(
        schemas(
            User,
            LocalizedText,
            Badge,
            SelectionType,
            CustomizationOption,
            CustomizationCategory,
            CustomizationSelection,
            Selection,
            MenuItem,
            MenuCategory,
            TodaySpecial,
            Order,
            OrderLine,
            OrderStatus,
            Cart,
            CartLine,
            TrackingStep,
            TrackingView,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            CartLineView,
            CartView,
            KitchenOrderList,
            StatusCounts,
            UpdateOrderStatusRequest,
            MenuSection,
            MenuView,
            MenuItemList,
            CategoryList,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            AvailabilityRequest,
            UpsertCategoryRequest,
            TableNumberInput,
            SubmitOrderRequest,
            SubmitOrderResponse,
            OrderFormDefaults,
            LastOrderResponse,
            EmailOrderRequest,
            EmailOrderResponse,
            EmailTemplateParams,
            ErrorData,
            params::Pagination,
            params::SortOrder,
            params::OrderListQuery,
            Meta,
            ApiResponse<MenuView>,
            ApiResponse<CartView>,
            ApiResponse<Order>,
            ApiResponse<KitchenOrderList>,
            ApiResponse<TrackingView>,
            ApiResponse<ErrorData>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Menu", description = "Menu catalogue endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order placement and tracking endpoints"),
        (name = "Kitchen", description = "Kitchen dashboard endpoints"),
        (name = "Auth", description = "Staff authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
