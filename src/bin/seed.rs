use anyhow::Context;
use digital_menu_api::{
    catalog::{default_categories, default_special, fallback_menu},
    db::{create_orm_conn, run_migrations},
    services::auth_service::ensure_staff_account,
    store::{MenuStore, NewMenuItem, PgStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let orm = create_orm_conn(&database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let store = PgStore::new(orm);

    let admin = ensure_staff_account(&store, "admin@example.com", "admin123", "admin").await?;
    let staff = ensure_staff_account(&store, "kitchen@example.com", "kitchen123", "staff").await?;
    seed_menu(&store).await?;

    println!("Seed completed. Admin ID: {}, Staff ID: {}", admin.id, staff.id);
    Ok(())
}

async fn seed_menu(store: &PgStore) -> anyhow::Result<()> {
    for category in default_categories() {
        store.upsert_category(category).await?;
    }
    println!("Seeded categories");

    if !store.list_menu_items().await?.is_empty() {
        println!("Menu already has items, skipping");
    } else {
        for item in fallback_menu() {
            store
                .insert_menu_item(NewMenuItem {
                    name: item.name,
                    description: item.description,
                    price: item.price,
                    prep_time: item.prep_time,
                    category: item.category,
                    badge: item.badge,
                    customizations: item.customizations,
                    available: item.available,
                })
                .await?;
        }
        println!("Seeded menu items");
    }

    if store.get_special().await?.is_none() {
        store.set_special(default_special()).await?;
        println!("Seeded today's special");
    }
    Ok(())
}
