use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240401_000001_create_po_tables::Migration),
            Box::new(m20240401_000002_create_report_tables::Migration),
            Box::new(m20240401_000003_create_upload_tracking_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240401_000001_create_po_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000001_create_po_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PoHeaders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PoHeaders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PoHeaders::Partner).string().not_null())
                        .col(ColumnDef::new(PoHeaders::PoNumber).string().not_null())
                        .col(ColumnDef::new(PoHeaders::PoDate).date().null())
                        .col(ColumnDef::new(PoHeaders::ExpiryDate).date().null())
                        .col(ColumnDef::new(PoHeaders::DeliveryDate).date().null())
                        .col(ColumnDef::new(PoHeaders::VendorName).string().null())
                        .col(ColumnDef::new(PoHeaders::VendorCode).string().null())
                        .col(ColumnDef::new(PoHeaders::VendorTaxId).string().null())
                        .col(ColumnDef::new(PoHeaders::BuyerName).string().null())
                        .col(ColumnDef::new(PoHeaders::ShipTo).string().null())
                        .col(ColumnDef::new(PoHeaders::BillTo).string().null())
                        .col(ColumnDef::new(PoHeaders::PaymentTerms).string().null())
                        .col(
                            ColumnDef::new(PoHeaders::TotalQuantity)
                                .decimal_len(14, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoHeaders::TaxableValue)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoHeaders::TaxAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoHeaders::GrandTotal)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PoHeaders::Status).string().not_null())
                        .col(ColumnDef::new(PoHeaders::AttachmentPath).string().null())
                        .col(ColumnDef::new(PoHeaders::CreatedBy).string().not_null())
                        .col(
                            ColumnDef::new(PoHeaders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PoHeaders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Final authority for the duplicate race: two imports of the same
            // (partner, po_number) cannot both commit.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_po_headers_partner_po_number")
                        .table(PoHeaders::Table)
                        .col(PoHeaders::Partner)
                        .col(PoHeaders::PoNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PoLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PoLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PoLines::HeaderId).big_integer().not_null())
                        .col(ColumnDef::new(PoLines::LineNumber).integer().not_null())
                        .col(ColumnDef::new(PoLines::ItemCode).string().not_null())
                        .col(ColumnDef::new(PoLines::ItemDescription).string().null())
                        .col(ColumnDef::new(PoLines::TaxCode).string().null())
                        .col(ColumnDef::new(PoLines::TaxCodeSource).string().null())
                        .col(
                            ColumnDef::new(PoLines::Quantity)
                                .decimal_len(14, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::UnitCost)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PoLines::Mrp).decimal_len(14, 2).null())
                        .col(
                            ColumnDef::new(PoLines::TaxableValue)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::IntegratedRate)
                                .decimal_len(7, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::IntegratedAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::CentralRate)
                                .decimal_len(7, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::CentralAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::StateRate)
                                .decimal_len(7, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::StateAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::SurchargeRate)
                                .decimal_len(7, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::SurchargeAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::TaxAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::LineTotal)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_lines_header_id")
                                .from(PoLines::Table, PoLines::HeaderId)
                                .to(PoHeaders::Table, PoHeaders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_po_lines_header_id")
                        .table(PoLines::Table)
                        .col(PoLines::HeaderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PoLedger::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PoLedger::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PoLedger::HeaderId).big_integer().not_null())
                        .col(ColumnDef::new(PoLedger::Partner).string().not_null())
                        .col(ColumnDef::new(PoLedger::PoNumber).string().not_null())
                        .col(ColumnDef::new(PoLedger::PoDate).date().null())
                        .col(ColumnDef::new(PoLedger::VendorName).string().null())
                        .col(ColumnDef::new(PoLedger::Distributor).string().null())
                        .col(
                            ColumnDef::new(PoLedger::TotalQuantity)
                                .decimal_len(14, 3)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PoLedger::GrandTotal)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PoLedger::Status).string().not_null())
                        .col(ColumnDef::new(PoLedger::CreatedBy).string().not_null())
                        .col(
                            ColumnDef::new(PoLedger::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_ledger_header_id")
                                .from(PoLedger::Table, PoLedger::HeaderId)
                                .to(PoHeaders::Table, PoHeaders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_po_ledger_partner_po_number")
                        .table(PoLedger::Table)
                        .col(PoLedger::Partner)
                        .col(PoLedger::PoNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PoLedger::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PoLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PoHeaders::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum PoHeaders {
        Table,
        Id,
        Partner,
        PoNumber,
        PoDate,
        ExpiryDate,
        DeliveryDate,
        VendorName,
        VendorCode,
        VendorTaxId,
        BuyerName,
        ShipTo,
        BillTo,
        PaymentTerms,
        TotalQuantity,
        TaxableValue,
        TaxAmount,
        GrandTotal,
        Status,
        AttachmentPath,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PoLines {
        Table,
        Id,
        HeaderId,
        LineNumber,
        ItemCode,
        ItemDescription,
        TaxCode,
        TaxCodeSource,
        Quantity,
        UnitCost,
        Mrp,
        TaxableValue,
        IntegratedRate,
        IntegratedAmount,
        CentralRate,
        CentralAmount,
        StateRate,
        StateAmount,
        SurchargeRate,
        SurchargeAmount,
        TaxAmount,
        LineTotal,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum PoLedger {
        Table,
        Id,
        HeaderId,
        Partner,
        PoNumber,
        PoDate,
        VendorName,
        Distributor,
        TotalQuantity,
        GrandTotal,
        Status,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240401_000002_create_report_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000002_create_report_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventorySnapshots::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventorySnapshots::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventorySnapshots::Partner)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventorySnapshots::BusinessUnit)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventorySnapshots::PeriodType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventorySnapshots::ReportDate).date().null())
                        .col(
                            ColumnDef::new(InventorySnapshots::PeriodStart)
                                .date()
                                .null(),
                        )
                        .col(ColumnDef::new(InventorySnapshots::PeriodEnd).date().null())
                        .col(ColumnDef::new(InventorySnapshots::Sku).string().not_null())
                        .col(
                            ColumnDef::new(InventorySnapshots::SkuDescription)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(InventorySnapshots::Category).string().null())
                        .col(ColumnDef::new(InventorySnapshots::Brand).string().null())
                        .col(ColumnDef::new(InventorySnapshots::City).string().null())
                        .col(
                            ColumnDef::new(InventorySnapshots::Quantity)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventorySnapshots::AttachmentPath)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventorySnapshots::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_snapshots_partner_sku")
                        .table(InventorySnapshots::Table)
                        .col(InventorySnapshots::Partner)
                        .col(InventorySnapshots::Sku)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SecondarySales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SecondarySales::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SecondarySales::Partner).string().not_null())
                        .col(
                            ColumnDef::new(SecondarySales::BusinessUnit)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SecondarySales::PeriodType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SecondarySales::ReportDate).date().null())
                        .col(ColumnDef::new(SecondarySales::PeriodStart).date().null())
                        .col(ColumnDef::new(SecondarySales::PeriodEnd).date().null())
                        .col(ColumnDef::new(SecondarySales::Sku).string().not_null())
                        .col(
                            ColumnDef::new(SecondarySales::SkuDescription)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(SecondarySales::Brand).string().null())
                        .col(ColumnDef::new(SecondarySales::SaleDate).date().not_null())
                        .col(
                            ColumnDef::new(SecondarySales::Quantity)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SecondarySales::Revenue)
                                .decimal_len(14, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SecondarySales::AttachmentPath)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(SecondarySales::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_secondary_sales_partner_sku_date")
                        .table(SecondarySales::Table)
                        .col(SecondarySales::Partner)
                        .col(SecondarySales::Sku)
                        .col(SecondarySales::SaleDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SecondarySales::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventorySnapshots::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum InventorySnapshots {
        Table,
        Id,
        Partner,
        BusinessUnit,
        PeriodType,
        ReportDate,
        PeriodStart,
        PeriodEnd,
        Sku,
        SkuDescription,
        Category,
        Brand,
        City,
        Quantity,
        AttachmentPath,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum SecondarySales {
        Table,
        Id,
        Partner,
        BusinessUnit,
        PeriodType,
        ReportDate,
        PeriodStart,
        PeriodEnd,
        Sku,
        SkuDescription,
        Brand,
        SaleDate,
        Quantity,
        Revenue,
        AttachmentPath,
        CreatedAt,
    }
}

mod m20240401_000003_create_upload_tracking_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000003_create_upload_tracking_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UploadTracking::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UploadTracking::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(UploadTracking::FileHash).string().not_null())
                        .col(ColumnDef::new(UploadTracking::Partner).string().not_null())
                        .col(
                            ColumnDef::new(UploadTracking::BusinessUnit)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UploadTracking::PeriodType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UploadTracking::UploadType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UploadTracking::FileName).string().not_null())
                        .col(
                            ColumnDef::new(UploadTracking::FileSize)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(UploadTracking::UploadedBy)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UploadTracking::UploadedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_upload_tracking_combination")
                        .table(UploadTracking::Table)
                        .col(UploadTracking::FileHash)
                        .col(UploadTracking::Partner)
                        .col(UploadTracking::BusinessUnit)
                        .col(UploadTracking::PeriodType)
                        .col(UploadTracking::UploadType)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UploadTracking::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum UploadTracking {
        Table,
        Id,
        FileHash,
        Partner,
        BusinessUnit,
        PeriodType,
        UploadType,
        FileName,
        FileSize,
        UploadedBy,
        UploadedAt,
    }
}
