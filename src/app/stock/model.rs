//! 库存数据模型

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: u32,
    pub image: String,
    pub in_stock: bool,
    pub stock_quantity: u32,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.in_stock && self.stock_quantity > 0
    }
}

/// `PUT /api/stock/:product` 请求体
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub in_stock: bool,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// `POST /api/stock/:product/decrease` 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct StockDecrease {
    pub amount: u32,
}

fn product(
    id: &str,
    name: &str,
    category: &str,
    price: u32,
    image: &str,
    in_stock: bool,
    stock_quantity: u32,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price,
        image: image.to_string(),
        in_stock,
        stock_quantity,
    }
}

/// 首次使用时写入的默认商品目录
pub fn default_catalog() -> Vec<Product> {
    vec![
        // Bracelets
        product("ocean-bloom", "Ocean Bloom", "Bracelets", 50, "/photos/flower.jpg", true, 5),
        product("sunset-pearl", "Sunset Pearl", "Bracelets", 50, "/photos/orange.png", true, 3),
        product("moonlight-charm", "Moonlight Charm", "Bracelets", 50, "/photos/star.png", true, 4),
        product("floral-grace", "Floral Grace", "Bracelets", 50, "/photos/jasmine.png", false, 0),
        product("midnight-shine", "Midnight Shine", "Bracelets", 50, "/photos/black1.jpg", true, 2),
        product("azure-dream", "Azure Dream", "Bracelets", 50, "/photos/blue.png", true, 6),
        product("twilight-drops", "Twilight Drops", "Bracelets", 50, "/photos/stars.png", true, 3),
        product("lime-bloom", "Lime Bloom", "Bracelets", 50, "/photos/Bloom.png", true, 4),
        product("blush-wings", "Blush Wings", "Bracelets", 50, "/photos/flies.png", true, 5),
        product("heart-bloom", "Heart Bloom", "Bracelets", 50, "/photos/fly.png", true, 4),
        product("dots-edition", "DOTS Edition", "Bracelets", 50, "/photos/dots.png", true, 3),
        product("queen-edition", "QUEEN Edition", "Bracelets", 50, "/photos/queen.png", true, 2),
        // Crochet
        product("olive-bloom", "Olive Bloom", "Crochet", 499, "/photos/green bag.png", true, 3),
        product("cherry-ember", "Cherry Ember", "Crochet", 499, "/photos/red bag.png", true, 2),
        // Clay
        product("avobuds", "AvoBuds", "Clay", 349, "/photos/avacado.webp", true, 4),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_respects_stock_invariant() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 15);
        for p in &catalog {
            assert_eq!(p.stock_quantity == 0, !p.in_stock, "{}", p.name);
        }
    }

    #[test]
    fn test_product_json_uses_camel_case() {
        let value = serde_json::to_value(&default_catalog()[0]).unwrap();
        assert_eq!(value["inStock"], true);
        assert_eq!(value["stockQuantity"], 5);
    }
}
