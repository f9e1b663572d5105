//! Conversions between backend wire types and core domain types.

use wheelhouse_core::{
    CartLine, DEFAULT_WAREHOUSE_ID, DEFAULT_WAREHOUSE_NAME, DiskSpec, Product,
    ProductCategory, ProductSpec, StockEntry, TireSpec, WarehouseId,
};

use super::types::{RawProduct, RemoteCartItem};

/// Build a domain product from a supplier row.
///
/// The category is not part of the row; it is known from the endpoint that
/// returned it. Rows without a price cannot be ordered and yield `None`.
#[must_use]
pub fn product_from_raw(raw: RawProduct, category: ProductCategory) -> Option<Product> {
    let price = raw.price?;
    let spec = match category {
        ProductCategory::Tires => ProductSpec::Tire(TireSpec {
            width: raw.width,
            height: raw.height,
            diameter: raw.diameter,
            season: raw.season,
            season_name: raw.season_name,
            load_index: raw.load_index,
            speed_index: raw.speed_index,
            studded: raw.thorn.unwrap_or(false),
            runflat: raw.runflat.unwrap_or(false),
        }),
        ProductCategory::Disks => ProductSpec::Disk(DiskSpec {
            width: raw.width,
            diameter: raw.diameter,
            pcd: raw.pcd,
            et: raw.et,
            dia: raw.dia,
            color: raw.color,
        }),
    };

    let stock = raw
        .whpr
        .map(|breakdown| {
            breakdown
                .wh_price_rest
                .into_iter()
                .map(|row| StockEntry {
                    rest: row.rest.unwrap_or(0),
                    warehouse: row.wrh,
                    price: row.price,
                })
                .collect()
        })
        .unwrap_or_default();

    let model = raw.model.or(raw.name).unwrap_or_default();

    Some(Product {
        code: raw.code,
        brand: raw.brand.unwrap_or_default(),
        model,
        price,
        price_original: raw.price_original,
        rest: raw.rest.unwrap_or(0),
        warehouse_id: raw.warehouse_id.map(WarehouseId::new),
        warehouse_name: raw.warehouse_name.filter(|name| !name.is_empty()),
        img_small: raw.img_small,
        stock,
        spec,
    })
}

/// Backend cart item mirroring a local cart line.
#[must_use]
pub fn remote_item_from_line(line: &CartLine) -> RemoteCartItem {
    let (width, height, diameter, season, pcd, et, dia, color) = match &line.spec {
        ProductSpec::Tire(tire) => (
            tire.width.clone(),
            tire.height.clone(),
            tire.diameter.clone(),
            tire.season.clone(),
            None,
            None,
            None,
            None,
        ),
        ProductSpec::Disk(disk) => (
            disk.width.clone(),
            None,
            disk.diameter.clone(),
            None,
            disk.pcd.clone(),
            disk.et.clone(),
            disk.dia.clone(),
            disk.color.clone(),
        ),
    };

    RemoteCartItem {
        code: line.code.clone(),
        name: line.name(),
        brand: line.brand.clone(),
        model: Some(line.model.clone()),
        quantity: line.quantity(),
        price: line.price,
        price_original: line.price_original,
        warehouse_id: line.warehouse_id.unwrap_or(DEFAULT_WAREHOUSE_ID).as_i32(),
        warehouse_name: line
            .warehouse_name
            .clone()
            .unwrap_or_else(|| DEFAULT_WAREHOUSE_NAME.to_string()),
        rest: line.rest,
        img_small: line.img_small.clone(),
        width,
        height,
        diameter,
        season,
        pcd,
        et,
        dia,
        color,
    }
}

/// Rebuild a product from a backend cart item so it can be re-added locally.
///
/// Items carrying disk parameters become disks; everything else is a tire.
#[must_use]
pub fn product_from_remote(item: &RemoteCartItem) -> Product {
    let is_disk = item.pcd.is_some() || item.et.is_some() || item.dia.is_some();
    let spec = if is_disk {
        ProductSpec::Disk(DiskSpec {
            width: item.width.clone(),
            diameter: item.diameter.clone(),
            pcd: item.pcd.clone(),
            et: item.et.clone(),
            dia: item.dia.clone(),
            color: item.color.clone(),
        })
    } else {
        ProductSpec::Tire(TireSpec {
            width: item.width.clone(),
            height: item.height.clone(),
            diameter: item.diameter.clone(),
            season: item.season.clone(),
            ..TireSpec::default()
        })
    };

    Product {
        code: item.code.clone(),
        brand: item.brand.clone(),
        model: item.model.clone().unwrap_or_else(|| item.name.clone()),
        price: item.price,
        price_original: item.price_original,
        rest: item.rest,
        warehouse_id: Some(WarehouseId::new(item.warehouse_id)),
        warehouse_name: Some(item.warehouse_name.clone()),
        img_small: item.img_small.clone(),
        stock: Vec::new(),
        spec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wheelhouse_core::{Cart, Price};

    fn raw(value: serde_json::Value) -> RawProduct {
        serde_json::from_value(value).expect("raw product")
    }

    #[test]
    fn test_tire_conversion() {
        let product = product_from_raw(
            raw(json!({
                "code": "T1",
                "brand": "Nokian",
                "model": "Nordman 8",
                "width": 205, "height": 55, "diameter": 16,
                "season": "w", "season_name": "Зимние",
                "price": 5750, "price_original": 5000,
                "rest": 12, "warehouse_id": 2, "warehouse_name": "Сургут",
                "thorn": true, "runflat": false,
                "whpr": { "wh_price_rest": [{ "rest": 4, "wrh": "Тюмень", "price": 5000 }] }
            })),
            ProductCategory::Tires,
        )
        .expect("priced row");

        assert_eq!(product.spec.size_label(), "205/55 R16");
        assert_eq!(product.price, Price::from_roubles(5750));
        assert_eq!(product.price_original, Some(Price::from_roubles(5000)));
        assert_eq!(product.availability(), (4, "Тюмень".to_string()));
        assert!(matches!(product.spec, ProductSpec::Tire(TireSpec { studded: true, .. })));
    }

    #[test]
    fn test_disk_conversion_uses_name_when_model_missing() {
        let product = product_from_raw(
            raw(json!({
                "code": "D1",
                "brand": "Replay",
                "name": "TY145",
                "width": 7.5, "diameter": 17,
                "pcd": "5x114.3", "et": 45, "dia": 60.1,
                "price": 9000
            })),
            ProductCategory::Disks,
        )
        .expect("priced row");

        assert_eq!(product.model, "TY145");
        assert_eq!(product.spec.size_label(), "7.5x17");
        assert_eq!(
            product.spec.disk_params().as_deref(),
            Some("PCD 5x114.3 · ET 45 · DIA 60.1")
        );
    }

    #[test]
    fn test_rows_without_price_are_skipped() {
        let unpriced = raw(json!({ "code": "T9", "brand": "Nokian", "model": "Hakka", "rest": 4 }));
        assert_eq!(product_from_raw(unpriced, ProductCategory::Tires), None);
    }

    #[test]
    fn test_remote_round_trip_keeps_category() {
        let disk = product_from_raw(
            raw(json!({ "code": "D1", "brand": "Replay", "model": "TY145", "pcd": "5x112", "price": 100 })),
            ProductCategory::Disks,
        )
        .expect("priced row");
        let mut cart = Cart::new();
        cart.add(&disk, 2);
        let line = cart.items().first().expect("line");

        let remote = remote_item_from_line(line);
        assert_eq!(remote.warehouse_id, 1);
        assert_eq!(remote.warehouse_name, "Москва");
        assert_eq!(remote.quantity, 2);

        let restored = product_from_remote(&remote);
        assert_eq!(restored.category(), ProductCategory::Disks);
        assert_eq!(restored.code, disk.code);
    }
}
