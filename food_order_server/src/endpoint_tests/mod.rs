mod catalog;
mod coupons;
mod helpers;
mod orders;
mod payments;
