// File: crates/slotbook_bookings/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    BookingListResponse, BookingResponse, CancellationResponse, CreateBookingRequest,
    CreateBookingResponse, PublicBooking, ResetResponse,
};
use slotbook_common::{Booking, BookingUpdate};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_booking_handler,
        crate::handlers::get_booking_handler,
        crate::handlers::modify_booking_handler,
        crate::handlers::cancel_booking_handler,
        crate::handlers::list_bookings_handler,
        crate::handlers::reset_bookings_handler
    ),
    components(
        schemas(
            Booking,
            BookingUpdate,
            CreateBookingRequest,
            CreateBookingResponse,
            BookingResponse,
            CancellationResponse,
            PublicBooking,
            BookingListResponse,
            ResetResponse
        )
    ),
    tags(
        (name = "Bookings", description = "Booking lifecycle by code"),
        (name = "Admin", description = "Administrative operations")
    ),
    servers(
        (url = "/api", description = "Slotbook API server")
    )
)]
pub struct BookingsApiDoc;
