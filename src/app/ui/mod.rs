mod charts;
mod controls;
mod panels;
mod table;
