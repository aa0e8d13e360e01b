use std::path::Path;

use storefront::{
    application::error::AppError,
    config::{ProductFields, ProductsCommand},
    domain::filter::ProductFilter,
};
use storefront_api_types::ProductFormData;
use tracing::debug;

use super::Ctx;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, command: ProductsCommand) -> Result<(), AppError> {
    match command {
        ProductsCommand::List {
            limit,
            skip,
            search,
            category,
        } => {
            let mut page = ctx.catalog.list_products(limit, skip).await?;
            let filter = ProductFilter::new(search.as_deref(), category.as_deref());
            page.products = filter.apply(page.products);
            print_json(&page)
        }
        ProductsCommand::Show { id } => {
            let product = ctx.catalog.get_product(id).await?;
            print_json(&product)
        }
        ProductsCommand::Create(fields) => {
            let data = form_data(ctx, empty_form(), fields).await?;
            let created = ctx.catalog.create_product(&data).await?;
            print_json(&created)
        }
        ProductsCommand::Update { id, fields } => {
            let current = ctx.catalog.get_product(id).await?;
            let data = form_data(ctx, ProductFormData::from(&current), fields).await?;
            let updated = ctx.catalog.update_product(id, &data).await?;
            print_json(&updated)
        }
        ProductsCommand::Delete { id } => {
            let deleted = ctx.catalog.delete_product(id).await?;
            print_json(&deleted)
        }
    }
}

fn empty_form() -> ProductFormData {
    ProductFormData {
        title: String::new(),
        price: 0.0,
        description: String::new(),
        brand: String::new(),
        category: String::new(),
        thumbnail: String::new(),
        images: Vec::new(),
    }
}

/// Overlay the supplied fields on `base`, upload the thumbnail if asked, then validate.
async fn form_data(
    ctx: &Ctx,
    mut base: ProductFormData,
    fields: ProductFields,
) -> Result<ProductFormData, AppError> {
    let ProductFields {
        title,
        price,
        description,
        brand,
        category,
        thumbnail,
        upload,
        images,
    } = fields;

    if let Some(title) = title {
        base.title = title;
    }
    if let Some(price) = price {
        base.price = price;
    }
    if let Some(description) = description {
        base.description = description;
    }
    if let Some(brand) = brand {
        base.brand = brand;
    }
    if let Some(category) = category {
        base.category = category;
    }
    if let Some(thumbnail) = thumbnail {
        base.thumbnail = thumbnail;
    }
    if let Some(path) = upload {
        let name = file_name(&path)?;
        let urls = ctx.uploader.upload(&[name]).await;
        if let Some(url) = urls.into_iter().next() {
            debug!(url = %url, "Using uploaded image as thumbnail");
            base.thumbnail = url;
        }
    }
    if !images.is_empty() {
        base.images = images;
    }

    base.validate()?;
    Ok(base)
}

fn file_name(path: &Path) -> Result<String, AppError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            AppError::invalid_input(format!("`{}` does not name a file", path.display()))
        })
}
