//! Seed the catalog with the starter bikes.
//!
//! Idempotent: does nothing when the catalog already has rows, so it is safe
//! to run on every deploy.

use rust_decimal::Decimal;
use tracing::info;

use torque_api::db;
use torque_api::db::bikes::{BikeInput, BikeRepository};

/// One starter catalog entry.
struct SeedBike {
    name: &'static str,
    cc: i64,
    price: i64,
    photo: &'static str,
    year: i32,
    brand: &'static str,
    category: &'static str,
    description: &'static str,
}

const STARTER_CATALOG: &[SeedBike] = &[
    SeedBike {
        name: "BMW F 900 R",
        cc: 895,
        price: 9995,
        photo: "/assets/bmw-f900-r.jpg",
        year: 2021,
        brand: "BMW",
        category: "Naked",
        description: "A dynamic roadster offering agile handling and a powerful parallel-twin engine, perfect for spirited rides.",
    },
    SeedBike {
        name: "BMW G 310 R",
        cc: 313,
        price: 5495,
        photo: "/assets/bmw-g310-r.jpg",
        year: 2022,
        brand: "BMW",
        category: "Naked",
        description: "A lightweight and nimble roadster, ideal for urban commuting and new riders, with BMW quality.",
    },
    SeedBike {
        name: "BMW R 1250 GS",
        cc: 1254,
        price: 17995,
        photo: "/assets/bmw-r1250-gs.jpg",
        year: 2023,
        brand: "BMW",
        category: "Adventure",
        description: "The benchmark adventure touring motorcycle, renowned for its versatility, comfort, and off-road capability.",
    },
    SeedBike {
        name: "BMW S 1000 RR",
        cc: 999,
        price: 16995,
        photo: "/assets/bmw-s1000-rr.jpg",
        year: 2020,
        brand: "BMW",
        category: "Sport",
        description: "A high-performance superbike designed for the track and road, featuring advanced electronics and a powerful inline-four engine.",
    },
    SeedBike {
        name: "Honda CRF450R",
        cc: 449,
        price: 9599,
        photo: "/assets/honda-crf-450r.jpg",
        year: 2023,
        brand: "Honda",
        category: "Off-Road",
        description: "A championship-winning motocross bike, offering exceptional power, handling, and durability for competitive riding.",
    },
    SeedBike {
        name: "Honda Gold Wing",
        cc: 1833,
        price: 23999,
        photo: "/assets/honda-goldwing.jpg",
        year: 2022,
        brand: "Honda",
        category: "Touring",
        description: "The pinnacle of touring comfort and technology, designed for long-distance journeys with luxurious amenities.",
    },
    SeedBike {
        name: "Honda Rebel 500",
        cc: 471,
        price: 6499,
        photo: "/assets/honda-rebel-500.jpg",
        year: 2023,
        brand: "Honda",
        category: "Cruiser",
        description: "A stylish and approachable cruiser, perfect for new riders or those seeking a lightweight and customizable urban ride.",
    },
    SeedBike {
        name: "Kawasaki Ninja 400",
        cc: 399,
        price: 5299,
        photo: "/assets/kawasaki-ninja-400.jpg",
        year: 2022,
        brand: "Kawasaki",
        category: "Sport",
        description: "A lightweight and agile sportbike, ideal for new riders and city commuting, offering a thrilling and manageable performance.",
    },
    SeedBike {
        name: "Suzuki GSX-R1000",
        cc: 999,
        price: 15599,
        photo: "/assets/suzuki-gsx-r1000.jpg",
        year: 2021,
        brand: "Suzuki",
        category: "Sport",
        description: "A legendary superbike known for its powerful engine, precise handling, and race-derived technology.",
    },
    SeedBike {
        name: "Yamaha YZF-R1",
        cc: 998,
        price: 17999,
        photo: "/assets/yamaha-yzf-r1.jpg",
        year: 2023,
        brand: "Yamaha",
        category: "Sport",
        description: "A purebred supersport machine, directly inspired by MotoGP, offering thrilling performance and advanced rider aids.",
    },
];

/// Seed the catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let bikes = BikeRepository::new(&pool);
    if !bikes.list_all().await?.is_empty() {
        info!("Catalog already seeded, nothing to do");
        return Ok(());
    }

    for seed in STARTER_CATALOG {
        bikes
            .create(&BikeInput {
                name: seed.name.to_owned(),
                cc: Decimal::from(seed.cc),
                price: Decimal::from(seed.price),
                photo: Some(seed.photo.to_owned()),
                year: seed.year,
                brand: Some(seed.brand.to_owned()),
                category: Some(seed.category.to_owned()),
                description: Some(seed.description.to_owned()),
                user_id: None,
            })
            .await?;
    }

    info!("Seeded {} bikes", STARTER_CATALOG.len());
    Ok(())
}
